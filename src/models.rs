use image::{DynamicImage, ImageBuffer, Luma, Rgba, RgbaImage};
use serde::Serialize;

use crate::error::ClassifyError;

/// Number of digit classes the model scores
pub const NUM_CLASSES: usize = 10;

/// Side length of the square model input
pub const INPUT_SIZE: u32 = 32;

/// Luma coefficients applied to R, G and B
pub const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Single-channel float image passed between preprocessing stages
pub type LumaGrid = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A user drawing as delivered by the drawing surface.
///
/// Always stored as RGBA8; three-channel sources get an opaque alpha.
#[derive(Debug, Clone)]
pub struct CanvasBitmap {
    pixels: RgbaImage,
}

impl CanvasBitmap {
    /// Build a bitmap from an interleaved byte buffer with 3 (RGB) or 4 (RGBA) channels
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, ClassifyError> {
        if width == 0 || height == 0 {
            return Err(ClassifyError::malformed(format!(
                "bitmap has zero dimension ({}x{})",
                width, height
            )));
        }
        if !(3..=4).contains(&channels) {
            return Err(ClassifyError::malformed(format!(
                "expected 3 or 4 color channels, got {}",
                channels
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| ClassifyError::malformed("bitmap dimensions overflow"))?;
        if data.len() != expected {
            return Err(ClassifyError::malformed(format!(
                "expected {} bytes for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channels,
                data.len()
            )));
        }

        let pixels = if channels == 4 {
            RgbaImage::from_raw(width, height, data)
                .ok_or_else(|| ClassifyError::malformed("buffer does not fit dimensions"))?
        } else {
            let mut rgba = RgbaImage::new(width, height);
            for (px, rgb) in rgba.pixels_mut().zip(data.chunks_exact(3)) {
                *px = Rgba([rgb[0], rgb[1], rgb[2], 255]);
            }
            rgba
        };

        Ok(Self { pixels })
    }

    /// Build a bitmap from a decoded image; grayscale sources are rejected
    pub fn from_image(img: &DynamicImage) -> Result<Self, ClassifyError> {
        let channels = img.color().channel_count();
        if channels < 3 {
            return Err(ClassifyError::malformed(format!(
                "expected a color image, got {} channel(s)",
                channels
            )));
        }
        Self::from_rgba(img.to_rgba8())
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, ClassifyError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ClassifyError::malformed(format!(
                "bitmap has zero dimension ({}x{})",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// True when no color channel holds a non-zero value (alpha is ignored)
    pub fn is_blank(&self) -> bool {
        self.pixels
            .pixels()
            .all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0)
    }
}

/// The 1x1x32x32 tensor handed to the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInput {
    values: Vec<f32>,
}

impl NormalizedInput {
    /// Wrap a grid that has already been resized and clamped
    pub fn from_grid(grid: LumaGrid) -> Result<Self, ClassifyError> {
        if grid.dimensions() != (INPUT_SIZE, INPUT_SIZE) {
            return Err(ClassifyError::malformed(format!(
                "normalized input must be {}x{}, got {}x{}",
                INPUT_SIZE,
                INPUT_SIZE,
                grid.width(),
                grid.height()
            )));
        }
        Ok(Self {
            values: grid.into_raw(),
        })
    }

    /// NCHW shape
    pub fn shape(&self) -> [usize; 4] {
        [1, 1, INPUT_SIZE as usize, INPUT_SIZE as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Probability of each digit, index i being digit i
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClassProbabilities([f32; NUM_CLASSES]);

impl ClassProbabilities {
    /// Softmax over raw model scores; the caller guarantees exactly 10 finite logits
    pub fn from_logits(logits: &[f32; NUM_CLASSES]) -> Self {
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut probs = [0.0f32; NUM_CLASSES];
        let mut sum = 0.0f32;
        for (p, &x) in probs.iter_mut().zip(logits) {
            *p = (x - max).exp();
            sum += *p;
        }
        // sum >= 1.0 since the max logit contributes exp(0)
        for p in probs.iter_mut() {
            *p /= sum;
        }
        Self(probs)
    }

    /// Index of the highest probability, lowest index on ties
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.0.iter().enumerate().skip(1) {
            if p > self.0[best] {
                best = i;
            }
        }
        best
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }
}

/// Classification outcome for one drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub digit: u8,
    pub probabilities: ClassProbabilities,
}

impl Prediction {
    pub fn from_probabilities(probabilities: ClassProbabilities) -> Self {
        Self {
            digit: probabilities.argmax() as u8,
            probabilities,
        }
    }

    /// Probability assigned to the predicted digit
    pub fn confidence(&self) -> f32 {
        self.probabilities.as_slice()[self.digit as usize]
    }
}

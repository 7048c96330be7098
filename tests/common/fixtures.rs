#![allow(dead_code)]

use digitcv::{CanvasBitmap, ClassifyError, Classifier, NormalizedInput};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Canvas size used by the drawing widget
pub const CANVAS_SIZE: u32 = 132;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Opaque black canvas, as handed over before anything is drawn
pub fn blank_canvas() -> CanvasBitmap {
    CanvasBitmap::from_rgba(RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, BLACK))
        .expect("blank canvas is well formed")
}

/// Thick white stroke between two points on a black canvas
pub fn stroke_canvas(from: (f32, f32), to: (f32, f32), width: i32) -> CanvasBitmap {
    let mut img = RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, BLACK);
    let steps = 200;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        draw_filled_circle_mut(&mut img, (x as i32, y as i32), width / 2, WHITE);
    }
    CanvasBitmap::from_rgba(img).expect("stroke canvas is well formed")
}

/// A slanted stroke roughly resembling a "1"
pub fn one_stroke() -> CanvasBitmap {
    stroke_canvas((80.0, 15.0), (55.0, 117.0), 8)
}

/// Deterministic stand-in for the trained network.
///
/// Each logit is a fixed pseudo-random projection of the input, so equal
/// inputs always score the same.
pub struct ProjectionClassifier {
    calls: AtomicUsize,
}

impl ProjectionClassifier {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn weight(class: usize, idx: usize) -> f32 {
        let mut h = (class as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ idx as u64;
        h ^= h >> 33;
        h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
        h ^= h >> 33;
        (h % 2001) as f32 / 1000.0 - 1.0
    }
}

impl Classifier for ProjectionClassifier {
    fn predict(&self, input: &NormalizedInput) -> Result<Vec<f32>, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..10)
            .map(|class| {
                input
                    .as_slice()
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v * Self::weight(class, i))
                    .sum::<f32>()
                    / 16.0
            })
            .collect())
    }
}

/// Always returns the given scores
pub struct FixedClassifier(pub Vec<f32>);

impl Classifier for FixedClassifier {
    fn predict(&self, _input: &NormalizedInput) -> Result<Vec<f32>, ClassifyError> {
        Ok(self.0.clone())
    }
}

/// Records the last input it saw
pub struct RecordingClassifier {
    pub last: std::sync::Mutex<Option<NormalizedInput>>,
}

impl RecordingClassifier {
    pub fn new() -> Self {
        Self {
            last: std::sync::Mutex::new(None),
        }
    }
}

impl Classifier for RecordingClassifier {
    fn predict(&self, input: &NormalizedInput) -> Result<Vec<f32>, ClassifyError> {
        *self.last.lock().unwrap() = Some(input.clone());
        Ok(vec![0.0; 10])
    }
}

use image::{GrayImage, ImageBuffer, Luma};

use crate::models::{CanvasBitmap, LUMA_WEIGHTS, LumaGrid};

/// Cubic convolution coefficient used by the bicubic kernel
const CUBIC_A: f32 = -0.75;

/// Convert a bitmap to luma, discarding alpha. Values stay in 0-255 units.
pub fn to_luma(bitmap: &CanvasBitmap) -> LumaGrid {
    let rgba = bitmap.as_rgba();
    let [wr, wg, wb] = LUMA_WEIGHTS;
    ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        Luma([wr * p[0] as f32 + wg * p[1] as f32 + wb * p[2] as f32])
    })
}

fn cubic_near(x: f32) -> f32 {
    ((CUBIC_A + 2.0) * x - (CUBIC_A + 3.0)) * x * x + 1.0
}

fn cubic_far(x: f32) -> f32 {
    ((CUBIC_A * x - 5.0 * CUBIC_A) * x + 8.0 * CUBIC_A) * x - 4.0 * CUBIC_A
}

/// Source taps and weights for every output coordinate along one axis.
/// Half-pixel centers; taps past the border are clamped to the edge.
fn axis_taps(in_size: u32, out_size: u32) -> Vec<([usize; 4], [f32; 4])> {
    let scale = in_size as f32 / out_size as f32;
    let last = in_size as i64 - 1;

    (0..out_size)
        .map(|dst| {
            let src = scale * (dst as f32 + 0.5) - 0.5;
            let base = src.floor();
            let t = src - base;
            let base = base as i64;

            let idx = [-1i64, 0, 1, 2].map(|off| (base + off).clamp(0, last) as usize);
            let weights = [
                cubic_far(t + 1.0),
                cubic_near(t),
                cubic_near(1.0 - t),
                cubic_far(2.0 - t),
            ];
            (idx, weights)
        })
        .collect()
}

/// Resize with a separable bicubic kernel (a = -0.75, no antialiasing).
///
/// Output may overshoot the input range near sharp edges.
pub fn resize_bicubic(grid: &LumaGrid, width: u32, height: u32) -> LumaGrid {
    let (in_w, in_h) = grid.dimensions();
    let cols = axis_taps(in_w, width);
    let rows = axis_taps(in_h, height);
    let src = grid.as_raw();
    let stride = in_w as usize;

    ImageBuffer::from_fn(width, height, |x, y| {
        let (xi, xw) = &cols[x as usize];
        let (yi, yw) = &rows[y as usize];
        let mut acc = 0.0f32;
        for (&row, &wy) in yi.iter().zip(yw) {
            let line = &src[row * stride..(row + 1) * stride];
            let mut row_acc = 0.0f32;
            for (&col, &wx) in xi.iter().zip(xw) {
                row_acc += line[col] * wx;
            }
            acc += row_acc * wy;
        }
        Luma([acc])
    })
}

/// Clip every value into `[min, max]`
pub fn clamp(grid: &LumaGrid, min: f32, max: f32) -> LumaGrid {
    let mut out = grid.clone();
    for px in out.pixels_mut() {
        px[0] = px[0].clamp(min, max);
    }
    out
}

/// Render a grid as an 8-bit image for debug dumps.
/// Grids whose peak exceeds 1.0 are scaled by that peak.
pub fn to_gray8(grid: &LumaGrid) -> GrayImage {
    let peak = grid.pixels().map(|p| p[0]).fold(1.0f32, f32::max);
    ImageBuffer::from_fn(grid.width(), grid.height(), |x, y| {
        let v = (grid.get_pixel(x, y)[0] / peak).clamp(0.0, 1.0);
        Luma([(v * 255.0).round() as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn grid_from(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> LumaGrid {
        ImageBuffer::from_fn(width, height, |x, y| Luma([f(x, y)]))
    }

    #[test]
    fn test_luma_weights() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([100, 50, 200, 0]));
        let bitmap = CanvasBitmap::from_rgba(rgba).unwrap();
        let luma = to_luma(&bitmap);
        let expected = 0.2989 * 100.0 + 0.5870 * 50.0 + 0.1140 * 200.0;
        assert!((luma.get_pixel(0, 0)[0] - expected).abs() < 1e-3);
    }

    #[test]
    fn test_white_luma_is_about_255() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        let luma = to_luma(&CanvasBitmap::from_rgba(rgba).unwrap());
        assert!((luma.get_pixel(1, 1)[0] - 254.97).abs() < 0.01);
    }

    #[test]
    fn test_kernel_weights_sum_to_one() {
        for (_, w) in axis_taps(132, 32) {
            let sum: f32 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_resize_constant_grid_is_preserved() {
        let grid = grid_from(132, 132, |_, _| 0.5);
        let resized = resize_bicubic(&grid, 32, 32);
        assert_eq!(resized.dimensions(), (32, 32));
        for p in resized.pixels() {
            assert!((p[0] - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_resize_identity_size() {
        let grid = grid_from(32, 32, |x, y| (x * 32 + y) as f32);
        let resized = resize_bicubic(&grid, 32, 32);
        for (a, b) in grid.pixels().zip(resized.pixels()) {
            assert!((a[0] - b[0]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_resize_shape_for_various_inputs() {
        for (w, h) in [(32, 32), (33, 40), (132, 132), (200, 64)] {
            let grid = grid_from(w, h, |x, y| ((x + y) % 7) as f32);
            assert_eq!(resize_bicubic(&grid, 32, 32).dimensions(), (32, 32));
        }
    }

    #[test]
    fn test_resize_overshoots_at_hard_edges() {
        // A step edge makes the negative lobes of the kernel ring
        let grid = grid_from(64, 64, |x, _| if x < 32 { 0.0 } else { 1.0 });
        let resized = resize_bicubic(&grid, 32, 32);
        let min = resized.pixels().map(|p| p[0]).fold(f32::INFINITY, f32::min);
        let max = resized.pixels().map(|p| p[0]).fold(f32::NEG_INFINITY, f32::max);
        assert!(min < 0.0 || max > 1.0);

        let clamped = clamp(&resized, 0.0, 1.0);
        assert!(clamped.pixels().all(|p| (0.0..=1.0).contains(&p[0])));
    }

    #[test]
    fn test_to_gray8_scales_by_peak() {
        let grid = grid_from(2, 1, |x, _| if x == 0 { 0.0 } else { 255.0 });
        let gray = to_gray8(&grid);
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 255);
    }
}

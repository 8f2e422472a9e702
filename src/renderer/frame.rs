//! Rendered frame output.
//!
//! Frames are RGBA8, row-major, top row first. The alpha channel follows the
//! render's `alpha_weight`:
//!
//! | `alpha_weight` | background | covered pixel                      | uncovered pixel   |
//! |----------------|------------|------------------------------------|-------------------|
//! | `0`            | any        | mesh colour, alpha 255             | bg/clear, alpha 0 |
//! | `w > 0`        | yes        | `lerp(mesh, bg, w)`, alpha 255     | bg, alpha 255     |
//! | `w > 0`        | no         | mesh colour, alpha `255 * (1 - w)` | clear, alpha 0    |

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::errors::{FaceMeshError, Result};

/// One rendered, composited image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub image: RgbaImage,
}

impl RenderedFrame {
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA bytes, row-major, top-to-bottom.
    #[must_use]
    pub fn as_rgba_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image
            .save_with_format(path.as_ref(), image::ImageFormat::Png)
            .map_err(FaceMeshError::from)
    }
}

/// Composites a rasterized colour buffer with its coverage mask.
///
/// `coverage` has one byte per pixel; non-zero means the depth test passed.
pub fn compose_rgba(
    color: &RgbaImage,
    coverage: &[u8],
    background: Option<&RgbaImage>,
    clear: [u8; 4],
    alpha_weight: f32,
) -> Result<RenderedFrame> {
    let (width, height) = color.dimensions();
    let pixels = (width as usize) * (height as usize);
    if coverage.len() != pixels {
        return Err(FaceMeshError::ShapeMismatch {
            context: "coverage mask",
            expected: pixels,
            actual: coverage.len(),
        });
    }
    if let Some(bg) = background
        && bg.dimensions() != (width, height)
    {
        return Err(FaceMeshError::ShapeMismatch {
            context: "background image",
            expected: pixels,
            actual: (bg.width() as usize) * (bg.height() as usize),
        });
    }

    let w = alpha_weight.clamp(0.0, 1.0);
    let mut out = RgbaImage::new(width, height);

    for ((x, y, dst), &covered) in out.enumerate_pixels_mut().zip(coverage) {
        let src = color.get_pixel(x, y).0;
        let bg = background.map_or(clear, |b| b.get_pixel(x, y).0);
        let covered = covered != 0;

        *dst = Rgba(match (covered, w > 0.0, background.is_some()) {
            (true, false, _) => [src[0], src[1], src[2], 255],
            (false, false, _) => [bg[0], bg[1], bg[2], 0],
            (true, true, true) => {
                let mix = |a: u8, b: u8| (f32::from(a) * (1.0 - w) + f32::from(b) * w).round() as u8;
                [mix(src[0], bg[0]), mix(src[1], bg[1]), mix(src[2], bg[2]), 255]
            }
            (false, true, true) => [bg[0], bg[1], bg[2], 255],
            (true, true, false) => [src[0], src[1], src[2], (255.0 * (1.0 - w)).round() as u8],
            (false, true, false) => [bg[0], bg[1], bg[2], 0],
        });
    }

    Ok(RenderedFrame { image: out })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn zero_weight_is_hard_mask() {
        let frame = compose_rgba(&red(2, 1), &[255, 0], None, [0, 0, 0, 0], 0.0).unwrap();
        assert_eq!(frame.as_rgba_bytes(), &[255, 0, 0, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn full_weight_shows_background_only() {
        let bg = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 255, 255]));
        let frame = compose_rgba(&red(2, 1), &[255, 0], Some(&bg), [0; 4], 1.0).unwrap();
        assert_eq!(frame.as_rgba_bytes(), &[0, 0, 255, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn mismatched_mask_is_rejected() {
        let err = compose_rgba(&red(2, 2), &[0; 3], None, [0; 4], 0.0).unwrap_err();
        assert!(matches!(err, FaceMeshError::ShapeMismatch { expected: 4, actual: 3, .. }));
    }
}

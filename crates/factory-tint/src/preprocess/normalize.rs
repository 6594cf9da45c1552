//! Size bounding for incoming subjects.
//!
//! Every later stage is `O(width * height)`, so bounding the long edge here
//! bounds the memory and time of the whole pipeline.

use crate::api::TintError;
use crate::buffer::{alloc_pixels, PixelBuffer, CHANNELS};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, RgbaImage};

/// Long-edge cap for the display/export path.
pub const DISPLAY_MAX_DIMENSION: u32 = 2000;

/// Long-edge cap applied before handing a photo to a subject isolator.
pub const ISOLATION_MAX_DIMENSION: u32 = 1500;

/// Dimensions after bounding the long edge to `max_dimension`.
///
/// The long side becomes exactly `max_dimension`; the short side is scaled
/// by the same factor and rounded to the nearest pixel (never below 1 unless
/// it was 0). Images already within the bound keep their dimensions.
///
/// # Example
///
/// ```
/// use factory_tint::preprocess::target_dimensions;
///
/// assert_eq!(target_dimensions(3000, 1000, 2000), (2000, 667));
/// assert_eq!(target_dimensions(800, 600, 2000), (800, 600));
/// ```
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let long = width.max(height);
    if long <= max_dimension {
        return (width, height);
    }

    let scale_short = |short: u32| -> u32 {
        if short == 0 {
            return 0;
        }
        let long = long as u64;
        let scaled = (short as u64 * max_dimension as u64 * 2 + long) / (2 * long);
        (scaled as u32).max(1)
    };

    if width >= height {
        (max_dimension, scale_short(height))
    } else {
        (scale_short(width), max_dimension)
    }
}

/// Bound `image` so its long edge is at most `max_dimension`.
///
/// Images within the bound are returned unchanged. Larger images are
/// resampled with a Catmull-Rom kernel on premultiplied alpha, so the
/// (irrelevant) color of transparent background pixels never bleeds into the
/// subject's edges.
pub fn normalize(image: &PixelBuffer, max_dimension: u32) -> Result<PixelBuffer, TintError> {
    if max_dimension == 0 {
        return Err(TintError::InvalidMaxDimension);
    }

    let (width, height) = target_dimensions(image.width(), image.height(), max_dimension);
    if (width, height) == image.dimensions() {
        return Ok(image.clone());
    }
    if image.is_empty() {
        return PixelBuffer::new(width, height);
    }

    tracing::debug!(
        from_width = image.width(),
        from_height = image.height(),
        to_width = width,
        to_height = height,
        "Downsampling subject"
    );
    resample(image, width, height)
}

/// Resample to exact dimensions (up or down).
pub(crate) fn resample(
    image: &PixelBuffer,
    width: u32,
    height: u32,
) -> Result<PixelBuffer, TintError> {
    let premultiplied = premultiply(image)?;
    let resized = imageops::resize(&premultiplied, width, height, FilterType::CatmullRom);
    Ok(unpremultiply(resized))
}

fn premultiply(image: &PixelBuffer) -> Result<RgbaImage, TintError> {
    let (width, height) = image.dimensions();
    let mut data = alloc_pixels(width, height)?;
    for (out, px) in data.chunks_exact_mut(CHANNELS).zip(image.pixels()) {
        let a = px[3] as u32;
        for c in 0..3 {
            out[c] = ((px[c] as u32 * a + 127) / 255) as u8;
        }
        out[3] = px[3];
    }
    let expected = data.len();
    ImageBuffer::from_raw(width, height, data).ok_or(TintError::BufferSize {
        width,
        height,
        expected,
        actual: expected,
    })
}

fn unpremultiply(image: RgbaImage) -> PixelBuffer {
    let mut image = image;
    for px in image.pixels_mut() {
        let a = px[3] as u32;
        if a == 0 {
            px.0 = [0, 0, 0, 0];
            continue;
        }
        for c in 0..3 {
            px[c] = ((px[c] as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    PixelBuffer::from(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_image_rounds_short_side() {
        assert_eq!(target_dimensions(3000, 1000, 2000), (2000, 667));
    }

    #[test]
    fn test_tall_image() {
        assert_eq!(target_dimensions(1000, 3000, 1500), (500, 1500));
    }

    #[test]
    fn test_square_and_passthrough() {
        assert_eq!(target_dimensions(4000, 4000, 2000), (2000, 2000));
        assert_eq!(target_dimensions(2000, 10, 2000), (2000, 10));
    }

    #[test]
    fn test_sliver_keeps_one_pixel() {
        assert_eq!(target_dimensions(10_000, 1, 100), (100, 1));
    }

    #[test]
    fn test_zero_extent_stays_empty() {
        assert_eq!(target_dimensions(0, 3000, 2000), (0, 2000));
        assert_eq!(target_dimensions(3000, 0, 2000), (2000, 0));

        let image = PixelBuffer::from_raw(0, 3000, Vec::new()).unwrap();
        let out = normalize(&image, 2000).unwrap();
        assert_eq!(out.dimensions(), (0, 2000));
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_max_dimension_is_rejected() {
        let image = PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
        assert!(matches!(
            normalize(&image, 0).unwrap_err(),
            TintError::InvalidMaxDimension
        ));
    }

    #[test]
    fn test_small_image_passes_through_unchanged() {
        let image = PixelBuffer::filled(30, 20, [12, 34, 56, 200]).unwrap();
        let out = normalize(&image, 2000).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_downsample_bound_and_aspect() {
        for &(w, h, max) in &[(300u32, 100u32, 200u32), (101, 333, 64), (640, 480, 100)] {
            let image = PixelBuffer::filled(w, h, [90, 90, 90, 255]).unwrap();
            let out = normalize(&image, max).unwrap();
            let (ow, oh) = out.dimensions();
            assert!(ow.max(oh) <= max, "{w}x{h} -> {ow}x{oh} exceeds {max}");
            let expected_short = if w >= h {
                h as f64 * ow as f64 / w as f64
            } else {
                w as f64 * oh as f64 / h as f64
            };
            let actual_short = f64::from(if w >= h { oh } else { ow });
            assert!(
                (actual_short - expected_short).abs() <= 1.0,
                "aspect drift for {w}x{h}: {ow}x{oh}"
            );
        }
    }

    #[test]
    fn test_resample_is_smooth_not_nearest() {
        // Left half black, right half white, with an odd split so the edge
        // falls between output pixels.
        let (w, h) = (401, 10);
        let mut data = Vec::with_capacity((w * h) as usize * 4);
        for _y in 0..h {
            for x in 0..w {
                let v = if x < 200 { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let image = PixelBuffer::from_raw(w, h, data).unwrap();
        let out = normalize(&image, 100).unwrap();

        let has_intermediate = out.pixels().any(|px| px[0] > 10 && px[0] < 245);
        assert!(has_intermediate, "Expected blended edge pixels");
        assert!(out.pixels().all(|px| px[3] == 255), "Opaque stays opaque");
    }

    #[test]
    fn test_transparent_background_does_not_bleed() {
        // Opaque gray subject on the left, transparent *red* background.
        let (w, h) = (400, 4);
        let mut data = Vec::with_capacity((w * h) as usize * 4);
        for _y in 0..h {
            for x in 0..w {
                if x < 200 {
                    data.extend_from_slice(&[100, 100, 100, 255]);
                } else {
                    data.extend_from_slice(&[255, 0, 0, 0]);
                }
            }
        }
        let image = PixelBuffer::from_raw(w, h, data).unwrap();
        let out = normalize(&image, 100).unwrap();

        for px in out.pixels().filter(|px| px[3] > 32) {
            let spread = px[0].abs_diff(px[1]);
            assert!(spread <= 2, "Background color bled into edge: {px:?}");
        }
    }
}

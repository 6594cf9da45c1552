//! Grayscale primer extraction.

use crate::api::TintError;
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::color::{luma, to_u8};

/// Convert a subject to its luma-grayscale primer.
///
/// Opaque and translucent pixels become `(L, L, L, A)`; background pixels
/// (alpha 0) become fully transparent. The primer is the neutral base the
/// paint goes onto, and is reused later as the texture-recovery layer.
///
/// # Example
///
/// ```
/// use factory_tint::PixelBuffer;
/// use factory_tint::preprocess::to_primer;
///
/// let subject = PixelBuffer::filled(1, 1, [255, 0, 0, 200]).unwrap();
/// let primer = to_primer(&subject).unwrap();
/// assert_eq!(primer.pixel(0, 0), [76, 76, 76, 200]);
/// ```
pub fn to_primer(subject: &PixelBuffer) -> Result<PixelBuffer, TintError> {
    subject.par_map_rows(|y, out| {
        let src = subject.row(y);
        for (o, s) in out
            .chunks_exact_mut(CHANNELS)
            .zip(src.chunks_exact(CHANNELS))
        {
            if s[3] == 0 {
                continue;
            }
            let l = to_u8(luma(s[0], s[1], s[2]));
            o.copy_from_slice(&[l, l, l, s[3]]);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primer_is_gray_with_same_alpha() {
        let data = vec![
            10, 200, 30, 255, //
            255, 255, 255, 64, //
            80, 80, 80, 1, //
            250, 10, 10, 0,
        ];
        let subject = PixelBuffer::from_raw(2, 2, data).unwrap();
        let primer = to_primer(&subject).unwrap();

        assert!(primer.alpha_matches(&subject));
        for px in primer.pixels() {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
        assert_eq!(primer.pixel(0, 0), [124, 124, 124, 255]);
        assert_eq!(primer.pixel(1, 0), [255, 255, 255, 64]);
        assert_eq!(primer.pixel(0, 1), [80, 80, 80, 1]);
    }

    #[test]
    fn test_background_becomes_transparent() {
        let subject = PixelBuffer::filled(3, 3, [250, 10, 10, 0]).unwrap();
        let primer = to_primer(&subject).unwrap();
        assert!(primer.pixels().all(|px| px == [0, 0, 0, 0]));
    }
}

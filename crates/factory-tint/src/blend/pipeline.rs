//! The ordered blend-stage pipeline.

use super::stage::{apply_stage, clip_to_subject, Operand, StageInputs};
use crate::api::TintError;
use crate::buffer::PixelBuffer;
use crate::color::TargetColor;
use crate::policy::StagePolicy;

/// Paint `original` in `color` following `policy`'s stage list.
///
/// [`TargetColor::NoTint`] returns a copy of `original` without running any
/// stage. Otherwise the accumulator starts as the policy's base layer
/// (normally the primer), every stage is composited in order, and the result
/// is clipped to the subject's silhouette.
///
/// The protection mask is *not* applied here; see
/// [`restore_protected_regions`](crate::mask::restore_protected_regions).
pub fn tint(
    original: &PixelBuffer,
    primer: &PixelBuffer,
    color: TargetColor,
    policy: &StagePolicy,
) -> Result<PixelBuffer, TintError> {
    let Some(fill) = color.paint() else {
        return Ok(original.clone());
    };
    original.ensure_same_shape(primer)?;
    policy.validate()?;

    let inputs = StageInputs {
        original,
        primer,
        fill,
    };

    let mut acc = match policy.base {
        Operand::Primer => primer.clone(),
        Operand::Original => original.clone(),
        Operand::Fill => PixelBuffer::filled(
            original.width(),
            original.height(),
            [fill.r, fill.g, fill.b, 255],
        )?,
    };
    for stage in &policy.stages {
        acc = apply_stage(&acc, stage, &inputs)?;
    }

    clip_to_subject(&acc, original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::preprocess::to_primer;

    fn subject() -> PixelBuffer {
        let mut data = Vec::new();
        for i in 0..16u8 {
            let alpha = if i % 5 == 0 { 0 } else { 255 - i };
            data.extend_from_slice(&[i * 15, 255 - i * 10, 40 + i * 3, alpha]);
        }
        PixelBuffer::from_raw(4, 4, data).unwrap()
    }

    #[test]
    fn test_no_tint_is_identity() {
        let original = subject();
        let primer = to_primer(&original).unwrap();
        let out = tint(
            &original,
            &primer,
            TargetColor::NoTint,
            &StagePolicy::default(),
        )
        .unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_alpha_plane_is_preserved() {
        let original = subject();
        let primer = to_primer(&original).unwrap();
        for policy in StagePolicy::presets() {
            let out = tint(
                &original,
                &primer,
                TargetColor::Paint(Rgb::new(0, 0x47, 0xAB)),
                &policy,
            )
            .unwrap();
            assert!(out.alpha_matches(&original));
        }
    }

    #[test]
    fn test_background_passes_through() {
        let original = subject();
        let primer = to_primer(&original).unwrap();
        let out = tint(
            &original,
            &primer,
            TargetColor::Paint(Rgb::new(255, 84, 0)),
            &StagePolicy::default(),
        )
        .unwrap();
        for (o, s) in out.pixels().zip(original.pixels()) {
            if s[3] == 0 {
                assert_eq!(o, s);
            }
        }
    }

    #[test]
    fn test_paint_moves_toward_target_hue() {
        let original = PixelBuffer::filled(2, 2, [120, 120, 120, 255]).unwrap();
        let primer = to_primer(&original).unwrap();
        let out = tint(
            &original,
            &primer,
            TargetColor::Paint(Rgb::new(0xCC, 0, 0)),
            &StagePolicy::default(),
        )
        .unwrap();
        let px = out.pixel(0, 0);
        assert!(px[0] > px[1] + 40, "Expected red paint, got {px:?}");
        assert!(px[0] > px[2] + 40, "Expected red paint, got {px:?}");
    }

    #[test]
    fn test_mismatched_primer_is_rejected() {
        let original = subject();
        let primer = PixelBuffer::new(3, 3).unwrap();
        let err = tint(
            &original,
            &primer,
            TargetColor::Paint(Rgb::new(1, 2, 3)),
            &StagePolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TintError::DimensionMismatch { .. }));
    }
}

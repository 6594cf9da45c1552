//! Protection mask engine.
//!
//! Photographed products carry chrome trim, glass lenses, printed stickers
//! and black rubber seals that should not take on the new paint. The mask
//! looks at each *original* pixel and decides how strongly to pull the
//! painted result back toward it:
//!
//! ```text
//! out = tinted * (1 - p) + original * p
//! ```
//!
//! Two rule sets are available:
//!
//! - [`SteppedMask`] (default): neutral/glass pixels get a two-step weight,
//!   blown-out highlights are fully restored, near-black is mostly restored.
//! - [`GradedMask`]: a continuous falloff over luma and channel spread that
//!   also catches stickers picking up colored reflections.
//!
//! Thresholds are data, not code: they are a product-tuning choice and are
//! carried in [`StagePolicy`](crate::StagePolicy).

use crate::api::TintError;
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::color::{chroma, luma, saturation, to_u8};
use serde::{Deserialize, Serialize};

/// Two-step neutral rule plus highlight and shadow rules.
///
/// Priority, first match wins:
/// 1. `L > highlight_luma` → 1.0
/// 2. `S < neutral_saturation && L > neutral_min_luma` →
///    `strong_neutral_weight` if `S < strong_neutral_saturation`, else
///    `weak_neutral_weight`
/// 3. `L < shadow_luma` → `shadow_weight`
/// 4. otherwise 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteppedMask {
    pub neutral_saturation: f32,
    pub neutral_min_luma: f32,
    pub strong_neutral_saturation: f32,
    pub strong_neutral_weight: f32,
    pub weak_neutral_weight: f32,
    pub highlight_luma: f32,
    pub shadow_luma: f32,
    pub shadow_weight: f32,
}

impl Default for SteppedMask {
    fn default() -> Self {
        Self {
            neutral_saturation: 0.10,
            neutral_min_luma: 50.0,
            strong_neutral_saturation: 0.05,
            strong_neutral_weight: 0.9,
            weak_neutral_weight: 0.5,
            highlight_luma: 240.0,
            shadow_luma: 10.0,
            shadow_weight: 0.9,
        }
    }
}

impl SteppedMask {
    pub fn weight(&self, r: u8, g: u8, b: u8) -> f32 {
        let l = luma(r, g, b);
        if l > self.highlight_luma {
            return 1.0;
        }
        let s = saturation(r, g, b);
        if s < self.neutral_saturation && l > self.neutral_min_luma {
            return if s < self.strong_neutral_saturation {
                self.strong_neutral_weight
            } else {
                self.weak_neutral_weight
            };
        }
        if l < self.shadow_luma {
            return self.shadow_weight;
        }
        0.0
    }
}

/// Continuous "sticker shield".
///
/// For `L > luma_floor` and channel spread `max - min < chroma_ceiling`:
///
/// ```text
/// p = min(1, min((L - luma_floor) / luma_span, 1) * (chroma_ceiling - spread) / chroma_ceiling * boost)
/// ```
///
/// and `L > highlight_luma` always restores fully.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradedMask {
    pub luma_floor: f32,
    pub luma_span: f32,
    pub chroma_ceiling: f32,
    pub boost: f32,
    pub highlight_luma: f32,
}

impl Default for GradedMask {
    fn default() -> Self {
        Self {
            luma_floor: 85.0,
            luma_span: 65.0,
            chroma_ceiling: 90.0,
            boost: 1.5,
            highlight_luma: 240.0,
        }
    }
}

impl GradedMask {
    pub fn weight(&self, r: u8, g: u8, b: u8) -> f32 {
        let l = luma(r, g, b);
        if l > self.highlight_luma {
            return 1.0;
        }
        let spread = chroma(r, g, b) as f32;
        if l > self.luma_floor && spread < self.chroma_ceiling {
            let luma_factor = ((l - self.luma_floor) / self.luma_span).min(1.0);
            let spread_factor = (self.chroma_ceiling - spread) / self.chroma_ceiling;
            return (luma_factor * spread_factor * self.boost).min(1.0);
        }
        0.0
    }
}

/// Which protection rule set to run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MaskPolicy {
    Stepped(SteppedMask),
    Graded(GradedMask),
    /// No protection; the tinted image is final.
    Disabled,
}

impl Default for MaskPolicy {
    fn default() -> Self {
        MaskPolicy::Stepped(SteppedMask::default())
    }
}

impl MaskPolicy {
    /// Restoration weight in 0..=1 for an original pixel.
    ///
    /// # Example
    ///
    /// ```
    /// use factory_tint::mask::MaskPolicy;
    ///
    /// let mask = MaskPolicy::default();
    /// assert_eq!(mask.protection(128, 128, 128), 0.9); // neutral gray
    /// assert_eq!(mask.protection(250, 250, 250), 1.0); // highlight
    /// assert_eq!(mask.protection(200, 30, 30), 0.0);   // paintable
    /// ```
    #[inline]
    pub fn protection(&self, r: u8, g: u8, b: u8) -> f32 {
        match self {
            MaskPolicy::Stepped(m) => m.weight(r, g, b),
            MaskPolicy::Graded(m) => m.weight(r, g, b),
            MaskPolicy::Disabled => 0.0,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), TintError> {
        let weights_ok = |ws: &[f32]| ws.iter().all(|w| w.is_finite() && (0.0..=1.0).contains(w));
        let thresholds_ok = |ts: &[f32]| ts.iter().all(|t| t.is_finite());
        let non_finite =
            || TintError::Policy("mask thresholds must be finite numbers".to_string());
        match self {
            MaskPolicy::Stepped(m) => {
                if !thresholds_ok(&[
                    m.neutral_saturation,
                    m.neutral_min_luma,
                    m.strong_neutral_saturation,
                    m.highlight_luma,
                    m.shadow_luma,
                ]) {
                    return Err(non_finite());
                }
                if !weights_ok(&[
                    m.strong_neutral_weight,
                    m.weak_neutral_weight,
                    m.shadow_weight,
                ]) {
                    return Err(TintError::Policy(
                        "mask weights must be within 0..=1".to_string(),
                    ));
                }
            }
            MaskPolicy::Graded(m) => {
                if !thresholds_ok(&[
                    m.luma_floor,
                    m.luma_span,
                    m.chroma_ceiling,
                    m.boost,
                    m.highlight_luma,
                ]) {
                    return Err(non_finite());
                }
                if !(m.luma_span > 0.0 && m.chroma_ceiling > 0.0) {
                    return Err(TintError::Policy(
                        "graded mask span and ceiling must be positive".to_string(),
                    ));
                }
            }
            MaskPolicy::Disabled => {}
        }
        Ok(())
    }
}

/// Pull tinted pixels back toward the original where the mask protects them.
///
/// Background pixels (original alpha 0) are copied through unchanged and
/// never measured. The output alpha is always the original alpha.
pub fn restore_protected_regions(
    tinted: &PixelBuffer,
    original: &PixelBuffer,
    mask: &MaskPolicy,
) -> Result<PixelBuffer, TintError> {
    tinted.ensure_same_shape(original)?;
    tinted.par_map_rows(|y, out| {
        let tinted_row = tinted.row(y);
        let original_row = original.row(y);
        for ((o, t), s) in out
            .chunks_exact_mut(CHANNELS)
            .zip(tinted_row.chunks_exact(CHANNELS))
            .zip(original_row.chunks_exact(CHANNELS))
        {
            if s[3] == 0 {
                o.copy_from_slice(s);
                continue;
            }
            let p = mask.protection(s[0], s[1], s[2]);
            if p <= 0.0 {
                o.copy_from_slice(&[t[0], t[1], t[2], s[3]]);
                continue;
            }
            for c in 0..3 {
                o[c] = to_u8(t[c] as f32 * (1.0 - p) + s[c] as f32 * p);
            }
            o[3] = s[3];
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepped_neutral_two_steps() {
        let mask = SteppedMask::default();
        // S = 0 < 0.05
        assert_eq!(mask.weight(128, 128, 128), 0.9);
        // S = 8/128 = 0.0625: between 0.05 and 0.10
        assert_eq!(mask.weight(128, 120, 120), 0.5);
        // S = 20/128 > 0.10: paintable
        assert_eq!(mask.weight(128, 108, 108), 0.0);
    }

    #[test]
    fn test_stepped_neutral_requires_luma() {
        let mask = SteppedMask::default();
        // Gray but dark (L = 40): neither neutral nor deep black
        assert_eq!(mask.weight(40, 40, 40), 0.0);
    }

    #[test]
    fn test_stepped_highlight_overrides_neutral() {
        let mask = SteppedMask::default();
        assert_eq!(mask.weight(245, 245, 245), 1.0);
        assert_eq!(mask.weight(255, 255, 255), 1.0);
    }

    #[test]
    fn test_stepped_deep_black() {
        let mask = SteppedMask::default();
        assert_eq!(mask.weight(0, 0, 0), 0.9);
        assert_eq!(mask.weight(20, 0, 0), 0.9);
    }

    #[test]
    fn test_graded_falloff() {
        let mask = GradedMask::default();
        // Dark: below luma floor
        assert_eq!(mask.weight(80, 80, 80), 0.0);
        // Colorful: spread above ceiling
        assert_eq!(mask.weight(230, 100, 100), 0.0);
        // Bright neutral saturates at 1.0
        assert_eq!(mask.weight(200, 200, 200), 1.0);
        // Partial: L = 100, spread 0 -> (15/65) * 1 * 1.5
        let p = mask.weight(100, 100, 100);
        assert!((p - 15.0 / 65.0 * 1.5).abs() < 1e-4, "p = {p}");
        assert_eq!(mask.weight(241, 241, 241), 1.0);
    }

    #[test]
    fn test_disabled_protects_nothing() {
        assert_eq!(MaskPolicy::Disabled.protection(255, 255, 255), 0.0);
    }

    #[test]
    fn test_restore_blends_toward_original() {
        let original = PixelBuffer::filled(1, 1, [128, 128, 128, 255]).unwrap();
        let tinted = PixelBuffer::filled(1, 1, [228, 28, 28, 255]).unwrap();
        let out = restore_protected_regions(&tinted, &original, &MaskPolicy::default()).unwrap();
        // 0.1 * 228 + 0.9 * 128 = 138; 0.1 * 28 + 0.9 * 128 = 118
        assert_eq!(out.pixel(0, 0), [138, 118, 118, 255]);
    }

    #[test]
    fn test_restore_skips_background() {
        let original = PixelBuffer::from_raw(1, 1, vec![255, 255, 255, 0]).unwrap();
        let tinted = PixelBuffer::from_raw(1, 1, vec![1, 2, 3, 0]).unwrap();
        let out = restore_protected_regions(&tinted, &original, &MaskPolicy::default()).unwrap();
        assert_eq!(out.pixel(0, 0), [255, 255, 255, 0]);
    }

    #[test]
    fn test_policy_serde_shape() {
        let yaml = "kind: stepped\nneutral_saturation: 0.22\nneutral_min_luma: 15\n";
        let mask: MaskPolicy = serde_yaml::from_str(yaml).unwrap();
        match mask {
            MaskPolicy::Stepped(m) => {
                assert_eq!(m.neutral_saturation, 0.22);
                assert_eq!(m.neutral_min_luma, 15.0);
                assert_eq!(m.highlight_luma, 240.0);
            }
            other => panic!("Expected stepped mask, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_weight() {
        let mask = MaskPolicy::Stepped(SteppedMask {
            shadow_weight: 1.5,
            ..SteppedMask::default()
        });
        assert!(mask.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_thresholds() {
        let yaml = "kind: stepped\nhighlight_luma: .nan\n";
        let mask: MaskPolicy = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(mask.validate(), Err(TintError::Policy(_))));

        let mask = MaskPolicy::Graded(GradedMask {
            luma_floor: f32::INFINITY,
            ..GradedMask::default()
        });
        assert!(mask.validate().is_err());

        assert!(MaskPolicy::Stepped(SteppedMask::default()).validate().is_ok());
        assert!(MaskPolicy::Graded(GradedMask::default()).validate().is_ok());
    }
}

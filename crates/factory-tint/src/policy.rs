//! Paint recipes.
//!
//! A [`StagePolicy`] bundles everything that is a tuning choice rather than
//! an algorithm: the accumulator's base layer, the ordered blend stages and
//! the protection-mask thresholds. Three presets ship with the crate:
//!
//! | Name             | Base     | Stages                                  | Mask    |
//! |------------------|----------|-----------------------------------------|---------|
//! | `factory-finish` | primer   | multiply, color, overlay, screen, wash  | stepped |
//! | `lean`           | primer   | multiply, color, overlay, screen        | stepped |
//! | `re-lighting`    | original | normal, multiply, screen, color         | graded  |
//!
//! Policies deserialize from YAML/JSON, so new tunings are configuration.

use crate::api::TintError;
use crate::blend::{BlendMode, BlendStage, Operand};
use crate::mask::{GradedMask, MaskPolicy};
use serde::{Deserialize, Serialize};

/// Name of the canonical preset.
pub const DEFAULT_PRESET: &str = "factory-finish";

/// Names accepted by [`StagePolicy::preset`].
pub const PRESET_NAMES: [&str; 3] = ["factory-finish", "lean", "re-lighting"];

const CANONICAL_STAGES: [BlendStage; 4] = [
    // Shadow definition
    BlendStage::new(BlendMode::Multiply, 0.9, Operand::Fill),
    // Vibrance
    BlendStage::new(BlendMode::Color, 0.8, Operand::Fill),
    // Texture recovery
    BlendStage::new(BlendMode::Overlay, 0.35, Operand::Primer),
    // Specular highlights
    BlendStage::new(BlendMode::Screen, 0.4, Operand::Original),
];

const WASH: BlendStage = BlendStage::new(BlendMode::SoftLight, 0.15, Operand::Fill);

/// An ordered blend recipe plus mask thresholds.
///
/// # Example
///
/// ```
/// use factory_tint::StagePolicy;
///
/// let policy: StagePolicy = serde_yaml::from_str(
///     r#"
/// stages:
///   - { mode: multiply, alpha: 0.9, operand: fill }
///   - { mode: screen, alpha: 0.4, operand: original }
/// mask:
///   kind: stepped
///   neutral_saturation: 0.2
/// "#,
/// )
/// .unwrap();
/// assert_eq!(policy.stages.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePolicy {
    /// Layer the accumulator starts from.
    #[serde(default = "default_base")]
    pub base: Operand,
    pub stages: Vec<BlendStage>,
    #[serde(default)]
    pub mask: MaskPolicy,
}

fn default_base() -> Operand {
    Operand::Primer
}

impl Default for StagePolicy {
    fn default() -> Self {
        Self::factory_finish()
    }
}

impl StagePolicy {
    /// The canonical recipe: four stages plus a soft-light wash, stepped mask.
    pub fn factory_finish() -> Self {
        let mut stages = CANONICAL_STAGES.to_vec();
        stages.push(WASH);
        Self {
            base: Operand::Primer,
            stages,
            mask: MaskPolicy::default(),
        }
    }

    /// The canonical recipe without the final wash.
    pub fn lean() -> Self {
        Self {
            base: Operand::Primer,
            stages: CANONICAL_STAGES.to_vec(),
            mask: MaskPolicy::default(),
        }
    }

    /// Paint over the photo itself and re-light it from the original.
    pub fn re_lighting() -> Self {
        Self {
            base: Operand::Original,
            stages: vec![
                BlendStage::new(BlendMode::Normal, 0.75, Operand::Fill),
                BlendStage::new(BlendMode::Multiply, 0.8, Operand::Original),
                BlendStage::new(BlendMode::Screen, 0.4, Operand::Original),
                BlendStage::new(BlendMode::Color, 0.5, Operand::Fill),
            ],
            mask: MaskPolicy::Graded(GradedMask::default()),
        }
    }

    /// Look a preset up by name (case-insensitive).
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "factory-finish" => Some(Self::factory_finish()),
            "lean" => Some(Self::lean()),
            "re-lighting" => Some(Self::re_lighting()),
            _ => None,
        }
    }

    /// Every shipped preset, in [`PRESET_NAMES`] order.
    pub fn presets() -> [Self; 3] {
        [Self::factory_finish(), Self::lean(), Self::re_lighting()]
    }

    /// Check stage alphas and mask parameters.
    pub fn validate(&self) -> Result<(), TintError> {
        for (i, stage) in self.stages.iter().enumerate() {
            if !stage.alpha.is_finite() || !(0.0..=1.0).contains(&stage.alpha) {
                return Err(TintError::Policy(format!(
                    "stage {i} alpha {} is outside 0..=1",
                    stage.alpha
                )));
            }
        }
        self.mask.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_factory_finish() {
        let policy = StagePolicy::default();
        assert_eq!(policy.base, Operand::Primer);
        assert_eq!(policy.stages.len(), 5);
        assert_eq!(policy.stages[0].mode, BlendMode::Multiply);
        assert_eq!(policy.stages[0].alpha, 0.9);
        assert_eq!(policy.stages[4].mode, BlendMode::SoftLight);
    }

    #[test]
    fn test_lean_drops_wash() {
        let lean = StagePolicy::lean();
        assert_eq!(lean.stages, StagePolicy::factory_finish().stages[..4].to_vec());
    }

    #[test]
    fn test_preset_lookup() {
        for name in PRESET_NAMES {
            assert!(StagePolicy::preset(name).is_some(), "missing preset {name}");
        }
        assert_eq!(StagePolicy::preset("LEAN"), Some(StagePolicy::lean()));
        assert_eq!(StagePolicy::preset("v12"), None);
    }

    #[test]
    fn test_presets_validate() {
        for policy in StagePolicy::presets() {
            policy.validate().unwrap();
        }
    }

    #[test]
    fn test_rejects_alpha_out_of_range() {
        let mut policy = StagePolicy::lean();
        policy.stages[1].alpha = 1.2;
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("stage 1"), "{err}");

        policy.stages[1].alpha = f32::NAN;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_yaml_defaults_base_and_mask() {
        let policy: StagePolicy =
            serde_yaml::from_str("stages:\n  - { mode: overlay, alpha: 0.35, operand: primer }\n")
                .unwrap();
        assert_eq!(policy.base, Operand::Primer);
        assert_eq!(policy.mask, MaskPolicy::default());
        assert_eq!(
            policy.stages,
            vec![BlendStage::new(BlendMode::Overlay, 0.35, Operand::Primer)]
        );
    }

    #[test]
    fn test_yaml_round_trip_of_re_lighting() {
        let policy = StagePolicy::re_lighting();
        let yaml = serde_yaml::to_string(&policy).unwrap();
        let back: StagePolicy = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, policy);
    }
}

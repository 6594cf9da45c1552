//! A single compositing step and the clip that closes the pipeline.

use super::BlendMode;
use crate::api::TintError;
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::color::{to_u8, Rgb};
use serde::{Deserialize, Serialize};

/// Which layer a stage paints with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operand {
    /// A solid fill of the target color.
    Fill,
    /// The grayscale primer of the subject.
    Primer,
    /// The untouched subject.
    Original,
}

/// One `(mode, alpha, operand)` step of a paint recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendStage {
    pub mode: BlendMode,
    pub alpha: f32,
    pub operand: Operand,
}

impl BlendStage {
    pub const fn new(mode: BlendMode, alpha: f32, operand: Operand) -> Self {
        Self {
            mode,
            alpha,
            operand,
        }
    }
}

/// Read-only layers a stage may draw from.
#[derive(Debug, Clone, Copy)]
pub struct StageInputs<'a> {
    pub original: &'a PixelBuffer,
    pub primer: &'a PixelBuffer,
    pub fill: Rgb,
}

/// Composite one stage onto `acc`, returning a new accumulator.
///
/// Per channel: `out = dst * (1 - a) + blend(src, dst) * a`, where `a` is the
/// stage alpha scaled by the operand pixel's own alpha (fills are opaque).
/// Background pixels of the original subject are copied through untouched.
pub fn apply_stage(
    acc: &PixelBuffer,
    stage: &BlendStage,
    inputs: &StageInputs<'_>,
) -> Result<PixelBuffer, TintError> {
    acc.ensure_same_shape(inputs.original)?;
    acc.ensure_same_shape(inputs.primer)?;

    let fill = inputs.fill.to_f32();
    acc.par_map_rows(|y, out| {
        let dst_row = acc.row(y);
        let original_row = inputs.original.row(y);
        let src_row = match stage.operand {
            Operand::Fill => None,
            Operand::Primer => Some(inputs.primer.row(y)),
            Operand::Original => Some(original_row),
        };

        for (x, o) in out.chunks_exact_mut(CHANNELS).enumerate() {
            let i = x * CHANNELS;
            let d = &dst_row[i..i + CHANNELS];
            o.copy_from_slice(d);
            if original_row[i + 3] == 0 {
                continue;
            }

            let (src, src_alpha) = match src_row {
                None => (fill, 1.0),
                Some(row) => (
                    [row[i] as f32, row[i + 1] as f32, row[i + 2] as f32],
                    row[i + 3] as f32 / 255.0,
                ),
            };
            let a = stage.alpha * src_alpha;
            if a <= 0.0 {
                continue;
            }

            let dst = [d[0] as f32, d[1] as f32, d[2] as f32];
            let blended = stage.mode.blend(src, dst);
            for c in 0..3 {
                o[c] = to_u8(dst[c] * (1.0 - a) + blended[c] * a);
            }
        }
    })
}

/// Restrict the accumulated paint to the subject's silhouette.
///
/// The result carries the original alpha plane; background pixels are the
/// original pixels, copied through unchanged.
pub fn clip_to_subject(
    acc: &PixelBuffer,
    original: &PixelBuffer,
) -> Result<PixelBuffer, TintError> {
    acc.ensure_same_shape(original)?;
    acc.par_map_rows(|y, out| {
        let acc_row = acc.row(y);
        let original_row = original.row(y);
        for ((o, a), s) in out
            .chunks_exact_mut(CHANNELS)
            .zip(acc_row.chunks_exact(CHANNELS))
            .zip(original_row.chunks_exact(CHANNELS))
        {
            if s[3] == 0 {
                o.copy_from_slice(s);
            } else {
                o.copy_from_slice(&[a[0], a[1], a[2], s[3]]);
            }
        }
    })
}

//! Blend stage pipeline.
//!
//! Paint is built up on an accumulator buffer by compositing a sequence of
//! layers, each with its own [`BlendMode`] and alpha. The canonical
//! "factory finish" recipe is:
//!
//! | # | Purpose            | Mode       | Alpha | Layer          |
//! |---|--------------------|------------|-------|----------------|
//! | 1 | Shadow definition  | multiply   | 0.90  | color fill     |
//! | 2 | Vibrance           | color      | 0.80  | color fill     |
//! | 3 | Texture recovery   | overlay    | 0.35  | primer         |
//! | 4 | Specular highlight | screen     | 0.40  | original       |
//! | 5 | Wash (optional)    | soft-light | 0.15  | color fill     |
//!
//! followed by a clip to the subject's alpha. Each stage is a pure
//! buffer-to-buffer function; the recipe itself is data, see
//! [`StagePolicy`](crate::StagePolicy).

mod mode;
mod pipeline;
mod stage;

pub use mode::BlendMode;
pub use pipeline::tint;
pub use stage::{apply_stage, clip_to_subject, BlendStage, Operand, StageInputs};

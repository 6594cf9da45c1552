//! Subject preparation ahead of painting.
//!
//! 1. **Normalize** - bound the long edge (Catmull-Rom, premultiplied alpha)
//! 2. **Primer** - luma-grayscale base layer the paint is applied on
//!
//! Normalizing happens first so every later stage runs at the bounded size.

mod normalize;
mod primer;

pub use normalize::{normalize, target_dimensions, DISPLAY_MAX_DIMENSION, ISOLATION_MAX_DIMENSION};
pub(crate) use normalize::resample;
pub use primer::to_primer;

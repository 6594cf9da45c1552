//! Finishing touches applied after painting.

mod watermark;

pub use watermark::{Watermark, DEFAULT_WATERMARK_OPACITY, DEFAULT_WATERMARK_SCALE};

//! Color types for the recoloring pipeline.
//!
//! The engine works in device RGB, 8 bits per channel:
//!
//! - [`Rgb`]: a plain paint color
//! - [`TargetColor`]: what a recolor request asks for, including the
//!   "leave the photo as-is" sentinel
//! - [`luma`] / [`saturation`]: the measures the primer and protection mask
//!   are built on

mod metrics;
mod target;

pub use metrics::{chroma, luma, saturation};
pub(crate) use metrics::to_u8;
pub use target::{ParseColorError, Rgb, TargetColor};

//! Unified error type for the factory-tint public API.
//!
//! [`TintError`] wraps every failure the pipeline can report into a single
//! enum for convenient `?` propagation in application code.

use crate::color::ParseColorError;
use crate::isolate::IsolationError;
use thiserror::Error;

/// Unified error type for the factory-tint public API.
///
/// A recolor call either returns a fully computed buffer or one of these
/// errors; callers never observe a partially blended buffer.
///
/// # Example
///
/// ```
/// use factory_tint::{PixelBuffer, TintError};
///
/// let err = PixelBuffer::decode(b"not an image").unwrap_err();
/// assert!(matches!(err, TintError::Decode(_)));
/// ```
#[derive(Debug, Error)]
pub enum TintError {
    /// Input bytes could not be decoded into a pixel buffer.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// A working buffer could not be allocated (or exceeds the configured
    /// working-set budget).
    #[error("cannot allocate {width}x{height} pixel buffer")]
    Allocation { width: u32, height: u32 },

    /// Raw pixel data does not match the declared dimensions.
    #[error("buffer length {actual} does not match {width}x{height} RGBA ({expected} bytes)")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Two buffers that must share a shape do not.
    #[error("buffer dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    /// A max dimension of zero was requested.
    #[error("max dimension must be at least 1")]
    InvalidMaxDimension,

    /// The stage policy carries out-of-range parameters.
    #[error("invalid stage policy: {0}")]
    Policy(String),

    /// The external subject isolator failed.
    #[error("subject isolation failed: {0}")]
    Isolation(#[from] IsolationError),

    /// Color parsing error (invalid hex string).
    #[error("color parse error: {0}")]
    ParseColor(#[from] ParseColorError),
}

impl TintError {
    /// Whether retrying at a smaller size could succeed.
    pub fn is_allocation(&self) -> bool {
        matches!(self, TintError::Allocation { .. })
    }
}

//! Seam for the external subject isolator.
//!
//! Background removal is not done here. A [`SubjectIsolator`] is whatever
//! segmentation model the application plugs in; this module only bounds
//! the photo it receives, relays its progress and checks what comes back.

use crate::api::TintError;
use crate::buffer::PixelBuffer;
use crate::preprocess::normalize;
#[cfg(doc)]
use crate::preprocess::ISOLATION_MAX_DIMENSION;
use std::fmt;
use thiserror::Error;

/// Failures reported by an isolator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsolationError {
    /// The isolator itself failed (model error, out of memory, ...).
    #[error("{0}")]
    Failed(String),

    /// The isolator returned an image of a different size than it was given.
    #[error("isolator returned {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Fractional progress reported during isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationProgress {
    pub current: u64,
    pub total: u64,
}

impl IsolationProgress {
    pub fn new(current: u64, total: u64) -> Self {
        Self { current, total }
    }

    /// Progress in 0..=1; zero when the total is unknown.
    pub fn fraction(self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current as f32 / self.total as f32).clamp(0.0, 1.0)
    }

    /// Whole percent, rounded.
    pub fn percent(self) -> u8 {
        (self.fraction() * 100.0).round() as u8
    }
}

impl fmt::Display for IsolationProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Produces an RGBA image whose background pixels have alpha 0.
pub trait SubjectIsolator: Send + Sync {
    fn isolate(
        &self,
        photo: &PixelBuffer,
        progress: &mut dyn FnMut(IsolationProgress),
    ) -> Result<PixelBuffer, IsolationError>;
}

/// Uses the photo's own alpha channel as the cut-out.
///
/// For inputs that were isolated upstream (PNG/WebP with transparency).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaPassthrough;

impl SubjectIsolator for AlphaPassthrough {
    fn isolate(
        &self,
        photo: &PixelBuffer,
        progress: &mut dyn FnMut(IsolationProgress),
    ) -> Result<PixelBuffer, IsolationError> {
        progress(IsolationProgress::new(1, 1));
        Ok(photo.clone())
    }
}

/// Bound `photo` to `max_dimension` and run `isolator` on it.
///
/// [`ISOLATION_MAX_DIMENSION`] is the usual bound. The returned subject has
/// the bounded photo's dimensions; an isolator that changes them is reported
/// as [`IsolationError::ShapeMismatch`].
pub fn isolate_subject(
    isolator: &dyn SubjectIsolator,
    photo: &PixelBuffer,
    max_dimension: u32,
    progress: &mut dyn FnMut(IsolationProgress),
) -> Result<PixelBuffer, TintError> {
    let bounded = normalize(photo, max_dimension)?;
    let subject = isolator.isolate(&bounded, progress)?;
    if subject.dimensions() != bounded.dimensions() {
        return Err(IsolationError::ShapeMismatch {
            expected: bounded.dimensions(),
            actual: subject.dimensions(),
        }
        .into());
    }
    Ok(subject)
}

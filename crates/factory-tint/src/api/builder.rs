//! Recolorer builder -- the primary entry point for the crate.
//!
//! [`Recolorer`] wraps the full pipeline (normalize, primer, blend stages,
//! protection mask) behind a fluent builder with the canonical defaults.

use crate::api::TintError;
use crate::blend::tint;
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::color::TargetColor;
use crate::mask::restore_protected_regions;
use crate::policy::StagePolicy;
use crate::preprocess::{normalize, target_dimensions, to_primer, DISPLAY_MAX_DIMENSION};
use std::time::Instant;

/// Full-size buffers alive at the peak of one recolor call: the normalized
/// subject, its primer, the accumulator and the output.
const WORKING_BUFFERS: u64 = 4;

/// A subject bounded to the working size, with its primer.
///
/// Preparing once and painting many times skips the resample and primer
/// extraction when only the color changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSubject {
    original: PixelBuffer,
    primer: PixelBuffer,
}

impl PreparedSubject {
    /// The normalized subject.
    #[inline]
    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    #[inline]
    pub fn primer(&self) -> &PixelBuffer {
        &self.primer
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.original.dimensions()
    }
}

/// High-level recoloring builder.
///
/// # Design
///
/// - Defaults: canonical `factory-finish` policy, 2000 px long edge, one
///   retry at half size on allocation failure, no working-set budget
/// - Configuration methods consume and return `self`
/// - [`recolor()`](Self::recolor) takes `&self`, so one builder serves any
///   number of subjects and threads
///
/// # Example
///
/// ```
/// use factory_tint::{PixelBuffer, Recolorer, Rgb, TargetColor};
///
/// let subject = PixelBuffer::filled(4, 4, [120, 90, 60, 255]).unwrap();
/// let recolorer = Recolorer::new().max_dimension(2000);
///
/// let painted = recolorer
///     .recolor(&subject, TargetColor::Paint(Rgb::new(0x00, 0x47, 0xAB)))
///     .unwrap();
/// assert_eq!(painted.dimensions(), (4, 4));
/// assert!(painted.alpha_matches(&subject));
/// ```
#[derive(Debug, Clone)]
pub struct Recolorer {
    policy: StagePolicy,
    max_dimension: u32,
    retry_on_allocation: bool,
    max_working_bytes: Option<u64>,
}

impl Default for Recolorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recolorer {
    pub fn new() -> Self {
        Self {
            policy: StagePolicy::default(),
            max_dimension: DISPLAY_MAX_DIMENSION,
            retry_on_allocation: true,
            max_working_bytes: None,
        }
    }

    /// Set the paint recipe.
    #[inline]
    pub fn policy(mut self, policy: StagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the long-edge cap applied before painting.
    #[inline]
    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Retry once at half the size when a buffer cannot be allocated.
    #[inline]
    pub fn retry_on_allocation(mut self, enabled: bool) -> Self {
        self.retry_on_allocation = enabled;
        self
    }

    /// Refuse working sets larger than `bytes` with [`TintError::Allocation`].
    ///
    /// The estimate counts every full-size RGBA buffer alive at once.
    #[inline]
    pub fn max_working_bytes(mut self, bytes: Option<u64>) -> Self {
        self.max_working_bytes = bytes;
        self
    }

    #[inline]
    pub fn stage_policy(&self) -> &StagePolicy {
        &self.policy
    }

    /// Normalize `subject` and extract its primer.
    pub fn prepare(&self, subject: &PixelBuffer) -> Result<PreparedSubject, TintError> {
        self.with_retry(subject, |max| self.prepare_at(subject, max))
    }

    /// Paint an already prepared subject.
    ///
    /// Runs the blend stages and then the protection mask.
    /// [`TargetColor::NoTint`] returns the prepared original unchanged.
    pub fn paint(
        &self,
        prepared: &PreparedSubject,
        color: TargetColor,
    ) -> Result<PixelBuffer, TintError> {
        if color.is_no_tint() {
            return Ok(prepared.original.clone());
        }
        let started = Instant::now();
        let tinted = tint(&prepared.original, &prepared.primer, color, &self.policy)?;
        let painted = restore_protected_regions(&tinted, &prepared.original, &self.policy.mask)?;
        tracing::debug!(
            width = painted.width(),
            height = painted.height(),
            color = %color,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Painted subject"
        );
        Ok(painted)
    }

    /// Normalize, prime and paint `subject` in `color`.
    pub fn recolor(
        &self,
        subject: &PixelBuffer,
        color: TargetColor,
    ) -> Result<PixelBuffer, TintError> {
        self.with_retry(subject, |max| {
            let prepared = self.prepare_at(subject, max)?;
            self.paint(&prepared, color)
        })
    }

    fn prepare_at(&self, subject: &PixelBuffer, max: u32) -> Result<PreparedSubject, TintError> {
        if max == 0 {
            return Err(TintError::InvalidMaxDimension);
        }
        let (width, height) = target_dimensions(subject.width(), subject.height(), max);
        self.check_budget(width, height)?;

        let original = normalize(subject, max)?;
        let primer = to_primer(&original)?;
        Ok(PreparedSubject { original, primer })
    }

    fn check_budget(&self, width: u32, height: u32) -> Result<(), TintError> {
        let Some(limit) = self.max_working_bytes else {
            return Ok(());
        };
        let needed = u64::from(width) * u64::from(height) * CHANNELS as u64 * WORKING_BUFFERS;
        if needed > limit {
            return Err(TintError::Allocation { width, height });
        }
        Ok(())
    }

    /// Run `attempt` at the configured cap, and once more at half the
    /// effective long edge if it failed to allocate.
    fn with_retry<T>(
        &self,
        subject: &PixelBuffer,
        attempt: impl Fn(u32) -> Result<T, TintError>,
    ) -> Result<T, TintError> {
        match attempt(self.max_dimension) {
            Err(err) if err.is_allocation() && self.retry_on_allocation => {
                let long = subject.width().max(subject.height());
                let halved = (self.max_dimension.min(long) / 2).max(1);
                tracing::warn!(
                    error = %err,
                    max_dimension = halved,
                    "Allocation failed, retrying at half size"
                );
                attempt(halved)
            }
            result => result,
        }
    }
}

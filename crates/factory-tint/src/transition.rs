//! Debounced color transitions.
//!
//! A new color does not take visual effect immediately. The controller holds
//! it as the *requested* color for a quiet period and only then promotes it to
//! the *displayed* color, which is the one the pipeline renders. Requests that
//! arrive during the quiet period replace the pending color and restart the
//! full delay, so a burst of clicks settles on the last one.
//!
//! The controller is a plain state machine: callers feed it request events
//! and timestamps, and arm whatever timer they have for [`deadline`]. Every
//! scheduled deadline carries an epoch; [`fire`] with an epoch that has since
//! been replaced or cancelled does nothing, so stale timers are harmless.
//!
//! [`deadline`]: TransitionController::deadline
//! [`fire`]: TransitionController::fire

use crate::color::TargetColor;
use std::time::{Duration, Instant};

/// Quiet period between the last request and the color taking effect.
pub const DEFAULT_TRANSITION_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Transitioning {
        from: TargetColor,
        to: TargetColor,
        deadline: Instant,
    },
}

/// What a [`TransitionController::request`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Idle and already displaying the requested color.
    Unchanged,
    /// A transition is pending; arm a timer for `deadline` tagged `epoch`.
    Scheduled { deadline: Instant, epoch: u64 },
}

/// A read-only view of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionState {
    pub displayed: TargetColor,
    pub requested: TargetColor,
    pub deadline: Option<Instant>,
    pub delay: Duration,
}

impl TransitionState {
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fraction of the painting delay elapsed at `now`, in 0..=1.
    ///
    /// Idle states report 1.0.
    pub fn progress(&self, now: Instant) -> f32 {
        let Some(deadline) = self.deadline else {
            return 1.0;
        };
        if self.delay.is_zero() {
            return 1.0;
        }
        let remaining = deadline.saturating_duration_since(now);
        (1.0 - remaining.as_secs_f32() / self.delay.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// The `Idle` / `Transitioning` state machine for one painting session.
///
/// # Example
///
/// ```
/// use factory_tint::{Rgb, TargetColor, TransitionController};
/// use std::time::{Duration, Instant};
///
/// let t0 = Instant::now();
/// let red = TargetColor::Paint(Rgb::new(0xCC, 0, 0));
/// let mut controller = TransitionController::new(TargetColor::NoTint);
///
/// controller.request(red, t0);
/// assert_eq!(controller.displayed(), TargetColor::NoTint);
///
/// assert_eq!(controller.poll(t0 + Duration::from_millis(999)), None);
/// assert_eq!(controller.poll(t0 + Duration::from_millis(1000)), Some(red));
/// assert_eq!(controller.displayed(), red);
/// ```
#[derive(Debug, Clone)]
pub struct TransitionController {
    displayed: TargetColor,
    phase: Phase,
    delay: Duration,
    epoch: u64,
}

impl TransitionController {
    /// Start idle on `initial` with the default one-second delay.
    pub fn new(initial: TargetColor) -> Self {
        Self::with_delay(initial, DEFAULT_TRANSITION_DELAY)
    }

    pub fn with_delay(initial: TargetColor, delay: Duration) -> Self {
        Self {
            displayed: initial,
            phase: Phase::Idle,
            delay,
            epoch: 0,
        }
    }

    /// The color the pipeline should render.
    #[inline]
    pub fn displayed(&self) -> TargetColor {
        self.displayed
    }

    /// The most recently requested color (equal to displayed when idle).
    pub fn requested(&self) -> TargetColor {
        match self.phase {
            Phase::Idle => self.displayed,
            Phase::Transitioning { to, .. } => to,
        }
    }

    /// The color a pending transition started from.
    pub fn transitioning_from(&self) -> Option<TargetColor> {
        match self.phase {
            Phase::Idle => None,
            Phase::Transitioning { from, .. } => Some(from),
        }
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    /// When the pending color takes effect.
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Idle => None,
            Phase::Transitioning { deadline, .. } => Some(deadline),
        }
    }

    /// Epoch of the currently scheduled deadline.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Ask for `color` at time `now`.
    ///
    /// While idle, a request for the displayed color is a no-op. Any other
    /// request schedules `now + delay`; during a transition the pending color
    /// is replaced and the deadline restarted, even if the new request
    /// matches the displayed color.
    pub fn request(&mut self, color: TargetColor, now: Instant) -> RequestOutcome {
        let from = match self.phase {
            Phase::Idle if color == self.displayed => return RequestOutcome::Unchanged,
            Phase::Idle => self.displayed,
            Phase::Transitioning { from, .. } => from,
        };
        let deadline = now + self.delay;
        self.epoch += 1;
        self.phase = Phase::Transitioning {
            from,
            to: color,
            deadline,
        };
        RequestOutcome::Scheduled {
            deadline,
            epoch: self.epoch,
        }
    }

    /// Settle the transition if its deadline has passed at `now`.
    ///
    /// Returns the newly displayed color when it changed state.
    pub fn poll(&mut self, now: Instant) -> Option<TargetColor> {
        match self.phase {
            Phase::Transitioning { deadline, .. } if now >= deadline => self.settle(),
            _ => None,
        }
    }

    /// Timer callback for the deadline scheduled under `epoch`.
    ///
    /// Stale epochs (superseded by a later request, or cancelled) are ignored.
    pub fn fire(&mut self, epoch: u64) -> Option<TargetColor> {
        if epoch != self.epoch {
            return None;
        }
        self.settle()
    }

    /// Drop any pending transition, keeping the displayed color.
    ///
    /// Invalidates the outstanding epoch so a timer that still fires later
    /// is a no-op.
    pub fn cancel(&mut self) {
        if self.is_transitioning() {
            self.epoch += 1;
            self.phase = Phase::Idle;
        }
    }

    pub fn state(&self) -> TransitionState {
        TransitionState {
            displayed: self.displayed,
            requested: self.requested(),
            deadline: self.deadline(),
            delay: self.delay,
        }
    }

    fn settle(&mut self) -> Option<TargetColor> {
        let Phase::Transitioning { to, .. } = self.phase else {
            return None;
        };
        self.displayed = to;
        self.phase = Phase::Idle;
        Some(to)
    }
}

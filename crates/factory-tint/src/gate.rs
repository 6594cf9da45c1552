//! Last-request-wins result delivery.
//!
//! Recolor calls may finish out of order. Each call takes a [`Ticket`] from a
//! [`ResultGate`] before it starts; when it finishes, its result is only
//! accepted if no newer ticket has been issued in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generation token for one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[inline]
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Monotonic generation counter shared by all computations for one consumer.
///
/// # Example
///
/// ```
/// use factory_tint::ResultGate;
///
/// let gate = ResultGate::new();
/// let slow = gate.issue();
/// let fast = gate.issue();
///
/// assert_eq!(gate.accept(fast, "fresh"), Some("fresh"));
/// assert_eq!(gate.accept(slow, "stale"), None);
/// ```
#[derive(Debug, Default)]
pub struct ResultGate {
    latest: AtomicU64,
}

impl ResultGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a computation, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `ticket` is still the newest one issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Hand `value` back only if `ticket` has not been superseded.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }

    /// Supersede every outstanding ticket without starting new work.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }
}

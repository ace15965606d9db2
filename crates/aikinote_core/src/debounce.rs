//! Trailing-edge debounce driven by caller-supplied instants.
//!
//! The view loop calls [`Debouncer::set`] on every input change and
//! [`Debouncer::poll`] once per frame/tick. A value is emitted only after it
//! has been stable for the full delay; superseded values never emit.

use std::time::{Duration, Instant};

/// Debounced view of a rapidly-changing value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    value: T,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    since: Instant,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Create a debouncer whose debounced value starts at `initial`.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            value: initial,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Current debounced value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Most recent input, pending or already emitted.
    pub fn latest(&self) -> &T {
        self.pending
            .as_ref()
            .map(|pending| &pending.value)
            .unwrap_or(&self.value)
    }

    /// `true` while an input is waiting out the delay.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Instant at which the pending input will be emitted.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|pending| pending.since + self.delay)
    }

    /// Record a new input at `now`, restarting the delay.
    ///
    /// An input equal to the latest one is ignored and does not restart the
    /// timer.
    pub fn set(&mut self, input: T, now: Instant) {
        if *self.latest() == input {
            return;
        }
        self.pending = Some(Pending {
            value: input,
            since: now,
        });
    }

    /// Emit the pending input if it has been stable for the full delay.
    ///
    /// # Returns
    /// `true` when the debounced value was replaced.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.flush()
    }

    /// Emit the pending input immediately, ignoring the delay.
    ///
    /// # Returns
    /// `true` when a pending input was emitted.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                self.value = pending.value;
                true
            }
            None => false,
        }
    }

    /// Drop any pending input so it can never be emitted.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

//! Cooperative debouncing driven by explicit instants.

use std::time::Duration;

use tokio::time::Instant;

/// Holds the latest input until it has been quiet for `delay`.
///
/// Each [`push`](Debouncer::push) replaces the pending value and restarts the
/// window, so of N inputs inside one window only the last is ever released.
/// The owner decides when to look: it polls at or after
/// [`deadline`](Debouncer::deadline), typically from a `sleep_until`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an input at `now`, cancelling any pending one.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending input becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending input if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, deadline)) if now >= deadline => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Release the pending input immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending input.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

//! Trailing-edge debouncer
//!
//! Holds the latest armed value and its deadline. Awaiting [`Debouncer::fired`]
//! is cancel-safe: dropping the future keeps the pending value, so it can be
//! raced against other events in a `select!` loop.

use std::time::Duration;
use tokio::time::Instant;

/// Debouncer for one buffered value
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    /// Create with the quiet period that must elapse before a value fires
    #[inline]
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Buffer `value`, replacing any pending one and restarting the timer
    pub fn arm(&mut self, value: T) {
        self.pending = Some((Instant::now() + self.delay, value));
    }

    /// Restart the timer of the pending value, if any
    pub fn reset(&mut self) {
        if let Some((deadline, _)) = &mut self.pending {
            *deadline = Instant::now() + self.delay;
        }
    }

    /// Drop the pending value; returns it if there was one
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    /// Whether a value is waiting for its quiet period to end
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending value to fire
    ///
    /// Returns `None` immediately when nothing is armed.
    pub async fn fired(&mut self) -> Option<T> {
        let deadline = self.pending.as_ref()?.0;
        tokio::time::sleep_until(deadline).await;
        self.cancel()
    }
}

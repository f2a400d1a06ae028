//! Trailing-edge debouncing for free-text input.
//!
//! The owner feeds raw values together with the instant they arrived and asks
//! [`Debouncer::poll`] from its event loop. Time is passed in, never read, so
//! the same unit works under a real clock and in tests.

use std::time::{Duration, Instant};

/// Quiet period applied to search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the latest input until it has been stable for the quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    due: Instant,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record a new input. Replaces any pending value and restarts the wait.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            due: now + self.quiet,
        });
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.due <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// When the pending value becomes due, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_single_emission_of_latest_value() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);

        debouncer.push("a", t0);
        debouncer.push("b", t0 + ms(100));
        debouncer.push("c", t0 + ms(250));

        let mut emissions = Vec::new();
        for step in 0..=1000 {
            if let Some(value) = debouncer.poll(t0 + ms(step)) {
                emissions.push((step, value));
            }
        }

        assert_eq!(emissions, vec![(550, "c")]);
    }

    #[test]
    fn test_not_due_before_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.push(String::from("rust"), t0);

        assert_eq!(debouncer.deadline(), Some(t0 + ms(300)));
        assert!(debouncer.poll(t0 + ms(299)).is_none());
        assert_eq!(debouncer.poll(t0 + ms(300)).as_deref(), Some("rust"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel_discards_pending() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.push(1, t0);
        debouncer.cancel();

        assert!(debouncer.poll(t0 + ms(10_000)).is_none());
        assert!(debouncer.deadline().is_none());
    }
}

//! Reconnect delay policy.

use std::time::Duration;

use rand::Rng;

/// Capped exponential backoff with jitter.
///
/// The base delay doubles per failed attempt up to the cap; the actual
/// delay is jittered between half the base and the full base so a fleet
/// of clients does not reconnect in lock-step. Attempts are unlimited;
/// the caller loops until the process terminates.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    /// Create a policy starting at `initial` and capped at `max`.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial: initial.max(Duration::from_millis(1)),
            max: max.max(initial),
            attempt: 0,
        }
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        // Shift saturates well past any real cap.
        let base = self
            .initial
            .saturating_mul(1u32 << self.attempt.min(20))
            .min(self.max);
        self.attempt = self.attempt.saturating_add(1);

        let base_ms = base.as_millis() as u64;
        let jittered = base_ms / 2 + rand::rng().random_range(0..=base_ms / 2);
        Duration::from_millis(jittered)
    }

    /// Number of failed attempts since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Reset after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_of(delay: Duration, base: Duration) {
        assert!(delay >= base / 2, "{delay:?} below half of {base:?}");
        assert!(delay <= base, "{delay:?} above {base:?}");
    }

    #[test]
    fn test_first_delay_uses_initial() {
        let mut backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(5));
        bounds_of(backoff.next_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_delays_double_up_to_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(5));

        bounds_of(backoff.next_delay(), Duration::from_millis(500));
        bounds_of(backoff.next_delay(), Duration::from_millis(1000));
        bounds_of(backoff.next_delay(), Duration::from_millis(2000));
        bounds_of(backoff.next_delay(), Duration::from_millis(4000));
        // Capped from here on.
        for _ in 0..10 {
            bounds_of(backoff.next_delay(), Duration::from_secs(5));
        }
    }

    #[test]
    fn test_many_attempts_do_not_overflow() {
        let mut backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(5));
        for _ in 0..100 {
            assert!(backoff.next_delay() <= Duration::from_secs(5));
        }
        assert_eq!(backoff.attempt(), 100);
    }

    #[test]
    fn test_reset_restarts_the_schedule() {
        let mut backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(5));
        for _ in 0..5 {
            backoff.next_delay();
        }

        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        bounds_of(backoff.next_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_initial_is_clamped() {
        let mut backoff = Backoff::new(Duration::ZERO, Duration::from_secs(5));
        // Must not panic or return zero forever.
        let _ = backoff.next_delay();
    }
}

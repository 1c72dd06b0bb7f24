//! Reconnect back-off schedule

use std::time::Duration;

/// Capped exponential back-off with a bounded retry budget
///
/// `next_delay` yields base, 2*base, 4*base, ... capped at `cap`, and
/// `None` once `max_attempts` consecutive failures have been consumed.
/// A successful connection resets the schedule.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            cap,
            max_attempts,
            attempt: 0,
        }
    }

    /// Delay before the next reconnect attempt, or `None` once the
    /// retry budget is exhausted
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        // Shift bounded so the multiplier can't overflow long before
        // the cap applies
        let exponent = self.attempt.min(16);
        self.attempt += 1;
        let delay = self
            .base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.cap);
        Some(delay.min(self.cap))
    }

    /// Attempts consumed since the last reset
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

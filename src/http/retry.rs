//! Retry policy with exponential backoff.

use std::time::Duration;

/// Maximum number of attempts for a SOAP call (first try included).
pub const MAX_ATTEMPTS: usize = 3;

/// Base of the exponential backoff.
pub const BACKOFF_MULTIPLIER: Duration = Duration::from_secs(1);

/// Lower bound on the delay between attempts.
pub const BACKOFF_MIN: Duration = Duration::from_secs(4);

/// Upper bound on the delay between attempts.
pub const BACKOFF_MAX: Duration = Duration::from_secs(10);

/// How often and how patiently a failed call is retried.
///
/// Every error is retried. The delay after attempt `n` (1-based) is
/// `multiplier * 2^(n-1)`, clamped to `[min_delay, max_delay]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub multiplier: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            multiplier: BACKOFF_MULTIPLIER,
            min_delay: BACKOFF_MIN,
            max_delay: BACKOFF_MAX,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without waiting.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Same backoff, different attempt budget. Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Number of attempts actually made, never less than one.
    pub fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as u32;
        let raw = self
            .multiplier
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay);
        raw.clamp(self.min_delay, self.max_delay.max(self.min_delay))
    }
}

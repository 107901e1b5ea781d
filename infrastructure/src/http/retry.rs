//! Retry policy for upstream requests.
//!
//! The three decisions are independent so each can be tested on its own:
//!
//! | Step | Function |
//! |------|----------|
//! | Attempt counter | [`RetryPolicy::has_attempts_remaining`] |
//! | Retryability | [`RetryPolicy::is_retryable_status`] |
//! | Backoff | [`RetryPolicy::delay_for_attempt`] |

use bbmcp_domain::GatewayError;
use std::time::Duration;

/// Total attempts per request, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles on each subsequent one.
pub const BASE_DELAY: Duration = Duration::from_secs(1);

/// Attempt bound plus exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt may follow attempt number `attempt` (1-based).
    pub fn has_attempts_remaining(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Server errors and rate limiting are transient; everything else is final.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        status >= 500 || status == 429
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Per-request retry bookkeeping. Lives only for one logical request.
#[derive(Debug, Default)]
pub struct RetryState {
    attempt: u32,
    last_error: Option<GatewayError>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the next attempt and return its 1-based number.
    pub fn next_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn record(&mut self, error: GatewayError) {
        self.last_error = Some(error);
    }

    pub fn into_last_error(self) -> Option<GatewayError> {
        self.last_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_are_bounded_at_three() {
        let policy = RetryPolicy::default();
        assert!(policy.has_attempts_remaining(1));
        assert!(policy.has_attempts_remaining(2));
        assert!(!policy.has_attempts_remaining(3));
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();
        for status in [429, 500, 502, 503, 504, 599] {
            assert!(policy.is_retryable_status(status), "{status}");
        }
        for status in [400, 401, 403, 404, 409, 422] {
            assert!(!policy.is_retryable_status(status), "{status}");
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(1 << 16));
    }

    #[test]
    fn test_state_tracks_attempts_and_last_error() {
        let mut state = RetryState::new();
        assert_eq!(state.next_attempt(), 1);
        state.record(GatewayError::Network("first".into()));
        assert_eq!(state.next_attempt(), 2);
        state.record(GatewayError::Network("second".into()));
        assert_eq!(state.attempt(), 2);
        assert_eq!(
            state.into_last_error(),
            Some(GatewayError::Network("second".into()))
        );
    }
}

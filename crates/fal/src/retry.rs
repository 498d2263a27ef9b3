//! Fixed-delay retry policy for remote edit calls.

use std::time::Duration;

use crate::error::EditError;

/// Attempts per logical call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// How many times to attempt a call and how long to wait in between.
///
/// The delay is constant; there is no backoff growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately. Intended for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    /// Effective attempt budget; a policy always makes at least one attempt.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before the next attempt, or `None` when `attempt` (1-based)
    /// failed with `error` and no further attempt should be made.
    pub fn next_delay(&self, attempt: u32, error: &EditError) -> Option<Duration> {
        if error.is_retryable() && attempt < self.attempts() {
            Some(self.delay)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_three_attempts_two_seconds_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn delay_is_constant_until_budget_is_spent() {
        let policy = RetryPolicy::default();
        let err = EditError::Timeout;
        assert_eq!(policy.next_delay(1, &err), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(2, &err), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(3, &err), None);
    }

    #[test]
    fn terminal_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_delay(1, &EditError::SafetyRejected), None);
        assert_eq!(policy.next_delay(1, &EditError::Payload("x".into())), None);
    }

    #[test]
    fn zero_attempts_still_means_one() {
        let policy = RetryPolicy::immediate(0);
        assert_eq!(policy.attempts(), 1);
        assert_eq!(policy.next_delay(1, &EditError::Timeout), None);
    }
}

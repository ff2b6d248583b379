//! Exponential backoff bookkeeping for stream reconnection.

use std::time::Duration;

use crate::config::RetryPolicy;

/// Tracks consecutive reconnection failures and the delay before the next
/// attempt.
///
/// The delay starts at the policy's initial value and doubles after each
/// spent failure, capped at the policy maximum. Reconnecting successfully
/// resets the delay; a stream that then ends without a fault clears the
/// failure count, so only unbroken runs of failures count toward the limit.
#[derive(Debug)]
pub(crate) struct Backoff {
    policy: RetryPolicy,
    next_delay: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            next_delay: policy.initial_delay,
            failures: 0,
        }
    }

    /// Record one failure.
    ///
    /// Returns the delay to wait before the next attempt, or `None` when
    /// the failure budget is spent and reconnection should stop.
    pub fn note_failure(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures >= self.policy.max_retries {
            return None;
        }
        let delay = self.next_delay;
        self.next_delay = (self.next_delay * 2).min(self.policy.max_delay);
        Some(delay)
    }

    /// Reset the delay after a connection was established.
    pub fn reset_delay(&mut self) {
        self.next_delay = self.policy.initial_delay;
    }

    /// Clear the failure count after a stream made progress.
    pub fn clear_failures(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures recorded so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

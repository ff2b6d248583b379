//! Tuning values for reconnection and polling.

use std::time::Duration;

/// Reconnection backoff tuning for the streaming controller.
///
/// After a mid-stream transport fault the controller resumes immediately;
/// only repeated failures sleep, doubling from `initial_delay` up to
/// `max_delay`. A successful reconnect resets the delay to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep before the second attempt of a failing reconnect cycle.
    pub initial_delay: Duration,
    /// Ceiling the doubling stops at.
    pub max_delay: Duration,
    /// Consecutive failed attempts tolerated before giving up.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            max_retries: 10,
        }
    }
}

/// Status-poll tuning for the non-streaming mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between status polls.
    pub interval: Duration,
    /// Total polls before the run is declared timed out (~1 hour at the
    /// default interval).
    pub max_polls: u32,
    /// Consecutive poll transport faults tolerated before propagating.
    pub max_consecutive_failures: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 720,
            max_consecutive_failures: 3,
        }
    }
}

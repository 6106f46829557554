// ── Bounded retry on transient unavailability ──
//
// A storage system that was just reconfigured answers 424 (or refuses
// connections) until its management port is back. Callers wrap the
// first request of a workflow in `retry_while_unavailable` so a
// follow-up task does not fail while the array settles.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::CoreError;

/// Fixed-delay retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 15,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Total number of attempts, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Run `operation` until it succeeds or fails with a non-transient error.
///
/// Transient errors (HTTP 424, connect failures, timeouts) are retried
/// up to `policy.max_retries` times. When the budget runs out the last
/// error is rendered with `on_exhausted` into `CoreError::Unavailable`.
/// Non-transient errors are returned immediately.
pub async fn retry_while_unavailable<T, F, Fut>(
    policy: &RetryPolicy,
    on_exhausted: impl FnOnce(&storctl_api::Error) -> String,
    mut operation: F,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, storctl_api::Error>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err.into()),
            Err(err) if attempt >= policy.max_attempts() => {
                return Err(CoreError::Unavailable {
                    attempts: attempt,
                    message: on_exhausted(&err),
                });
            }
            Err(err) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts(),
                    error = %err,
                    "storage system unavailable, retrying in {:?}",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

//! Bounded retry with linear backoff
//!
//! One policy object drives every remote call instead of a hand-written
//! loop per call site.

use std::time::Duration;

/// Retry parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff after failed attempt `n` is `backoff_step * n`
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, sleeping 100ms, 200ms, 300ms after each failure
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based)
    pub fn backoff_for(&self, failed_attempt: u32) -> Duration {
        self.backoff_step * failed_attempt
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` retryable failures have happened.
///
/// **Algorithm:**
/// 1. Attempt operation
/// 2. If successful, return result
/// 3. If the error is not retryable: return it immediately (no retry, no sleep)
/// 4. Otherwise sleep `backoff_step * attempt`, log WARN, and:
///    a. if attempts remain, try again
///    b. if this was the last attempt, log ERROR and return the error
///
/// The sleep also follows the final failing attempt, so three failures cost
/// 100ms + 200ms + 300ms with the default policy.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "get_checklist")
/// * `call_args` - Call arguments rendered for logging
/// * `policy` - Attempt limit and backoff step
/// * `is_retryable` - Classifies an error as transient
/// * `operation` - Async closure performing one attempt
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    operation_name: &str,
    call_args: &str,
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::warn!(
                        operation = operation_name,
                        args = call_args,
                        attempt,
                        "Remote call succeeded after retry"
                    );
                } else {
                    tracing::debug!(operation = operation_name, args = call_args, "Remote call succeeded");
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }

                tokio::time::sleep(policy.backoff_for(attempt)).await;

                tracing::warn!(
                    operation = operation_name,
                    args = call_args,
                    attempt,
                    error = %err,
                    "{} attempt {} failed",
                    operation_name,
                    attempt
                );

                if attempt >= policy.max_attempts {
                    tracing::error!(
                        operation = operation_name,
                        args = call_args,
                        attempt,
                        error = %err,
                        "{} failed after {} attempts",
                        operation_name,
                        attempt
                    );
                    return Err(err);
                }
            }
        }
    }
}

//! Retry with exponential backoff for transient transport failures.
//!
//! Only [`ClientError::Transport`] is retried. Upstream status errors,
//! validation failures and decode errors are returned after the first
//! attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// How many times to attempt a call and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base,
        }
    }

    /// Sleep after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    ///
    /// | failed attempt | delay (base 2 s) |
    /// |----------------|------------------|
    /// | 1              | 2 s              |
    /// | 2              | 4 s              |
    /// | 3              | 8 s              |
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` attempts have failed.
///
/// Returns the value together with the number of attempts made. When every
/// attempt fails with a transport error the result is
/// [`ClientError::ExhaustedRetries`] wrapping the last failure.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<(T, u32), ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok((value, attempt)),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => err,
        };

        if attempt >= max_attempts {
            tracing::warn!(attempts = attempt, error = %err, "retries exhausted");
            return Err(ClientError::ExhaustedRetries {
                attempts: attempt,
                last_error: Box::new(err),
            });
        }

        let delay = policy.delay_after(attempt);
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient transport error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

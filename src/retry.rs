use std::future::Future;
use std::time::Duration;

use rand::Rng as _;

/// Exponential backoff with jitter for transient HTTP failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_secs: 5,
            max_delay_secs: 60,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `attempt` (0-indexed):
    /// `min(base * 2^attempt, max) + jitter(0..base)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay_secs
            .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        let capped = exponential.min(self.max_delay_secs);
        let jitter = if self.base_delay_secs > 0 {
            rand::thread_rng().gen_range(0..self.base_delay_secs)
        } else {
            0
        };
        Duration::from_secs(capped + jitter)
    }
}

/// Run `operation`, retrying errors accepted by `is_retryable` with
/// backoff between attempts. Returns the first success, or the error that
/// stopped the attempts (non-retryable, or retries exhausted).
pub async fn with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    is_retryable: impl Fn(&E) -> bool,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let total_attempts = policy.max_retries + 1;
    let mut last_err: Option<E> = None;

    for attempt in 0..total_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !is_retryable(&e) || attempt + 1 >= total_attempts {
                    last_err = Some(e);
                    break;
                }
                let delay = policy.delay(attempt);
                tracing::warn!(
                    "Transient error (attempt {}/{}), retrying in {}s: {}",
                    attempt + 1,
                    total_attempts,
                    delay.as_secs(),
                    e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(last_err.expect("loop must have run at least once"))
}

use rand::{RngExt, rng};
use std::time::Duration;

use crate::StoreError;

/// Retries transient store failures with exponential backoff and jitter.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent.
    pub async fn retry_async<F, Fut, T>(&self, mut f: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        return Err(e);
                    }
                    tracing::debug!(attempt, error = %e, "retrying store request");
                    // exponential backoff with jitter
                    let max_delay = self.base_delay * (1u32 << attempt.min(16));
                    let max_ms = max_delay.as_millis() as u64;
                    if max_ms > 0 {
                        let jitter = rng().random_range(0..max_ms);
                        tokio::time::sleep(Duration::from_millis(jitter)).await;
                    }
                }
            }
        }
    }
}

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::http::api_error::ApiError;

/// Exponential backoff used for idempotent analytics reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { max_retries: 3, base_delay: Duration::from_secs(1), max_delay: Duration::from_secs(30) }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy { max_retries: 0, ..Default::default() }
    }

    /// Whether a request that failed `failures` times (so far) with `err` should be attempted again.
    pub fn should_retry(&self, failures: u32, err: &ApiError) -> bool {
        !err.is_not_found() && failures <= self.max_retries
    }

    /// Backoff before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut failures = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failures += 1;
                    if !self.should_retry(failures, &err) {
                        return Err(err);
                    }
                    let wait = self.backoff(failures - 1);
                    log::warn!("{} failed (attempt {}): {}. Retrying in {:?}.", label, failures, err, wait);
                    sleep(wait).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(4), Duration::from_secs(16));
        assert_eq!(policy.backoff(5), Duration::from_secs(30));
        assert_eq!(policy.backoff(40), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), ApiError> = RetryPolicy::default()
            .run("revenue", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::Timeout { url: "http://localhost".into() }) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_not_retried() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), ApiError> = RetryPolicy::default()
            .run("revenue", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::NotFound { url: "http://localhost".into() }) }
            })
            .await;

        assert!(matches!(result, Err(ApiError::NotFound { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let attempts = AtomicU32::new(0);
        let result = RetryPolicy::default()
            .run("revenue", || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err(ApiError::Server { url: "x".into(), status: 503, body: String::new() }) } else { Ok(n) } }
            })
            .await;

        assert_eq!(result, Ok(2));
    }
}

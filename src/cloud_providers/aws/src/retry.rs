use std::future::Future;
use std::time::Duration;

use awscalc_estimator::CatalogError;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

const MAX_DELAY: Duration = Duration::from_secs(20);

/// Bounded retry for catalog requests
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: usize,
    pub base_delay: Duration,
    /// Limit on each attempt, pagination included
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// `base_delay`, doubled after every retry, before jitter
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        // from_millis(2) doubles, the factor scales the first delay to base_delay
        let factor = (self.base_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(MAX_DELAY)
            .take(self.retries)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the retries run out. Attempts that exceed the timeout count as
    /// [`CatalogError::Timeout`].
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, CatalogError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let timeout = self.timeout;
        let strategy = self.delays().map(jitter);

        RetryIf::spawn(
            strategy,
            || {
                let attempt = operation();
                async move {
                    tokio::time::timeout(timeout, attempt)
                        .await
                        .unwrap_or_else(|_| Err(CatalogError::Timeout(timeout)))
                }
            },
            |err: &CatalogError| {
                let retryable = err.is_retryable();
                if retryable {
                    tracing::warn!(error = %err, "Pricing request failed, retrying");
                }
                retryable
            },
        )
        .await
    }
}

//! Retry with exponential backoff for provider calls

use crate::config::BotConfig;
use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently a provider call is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.max_retries, config.retry_backoff_base)
    }

    /// Delay before retry number `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    pub async fn run<T, F, Fut>(&self, provider: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(err) if err.is_transient() && attempt + 1 < self.max_attempts => {
                    let backoff = self.backoff(attempt);
                    tracing::warn!(
                        provider,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Provider request failed, retrying in {:?}",
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

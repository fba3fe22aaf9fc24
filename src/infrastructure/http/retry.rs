//! Bounded retry loop with linear backoff

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::shared::errors::FetchError;
use crate::shared::types::ApiConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Budget for a single attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: config.retry_delay(),
            attempt_timeout: config.timeout(),
        }
    }

    /// Pause after the given failed attempt (1-based): base, 2x base, 3x base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is spent.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut operation: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!("🌐 {} (attempt {}/{})", what, attempt, policy.max_attempts);

        let result = match timeout(policy.attempt_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(policy.attempt_timeout)),
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    info!("✅ {} succeeded on attempt {}", what, attempt);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                warn!("❌ {} failed (not retryable): {}", what, e);
                return Err(e);
            }
            Err(e) => {
                warn!("⚠️ {} attempt {}/{} failed: {}", what, attempt, policy.max_attempts, e);

                if attempt >= policy.max_attempts {
                    return Err(FetchError::RetriesExhausted {
                        what: what.to_string(),
                        attempts: attempt,
                        last_error: Box::new(e),
                    });
                }

                let delay = policy.delay_for(attempt);
                debug!("Retrying {} in {:?}", what, delay);
                sleep(delay).await;
            }
        }
    }
}

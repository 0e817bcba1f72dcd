//! Retry with exponential backoff and jitter for idempotent reads.

use crate::config::NetworkConfig;
use crate::error::{ChirperError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: NetworkConfig::MAX_RETRIES,
            base_delay: NetworkConfig::RETRY_BASE_DELAY,
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A config that makes exactly one attempt.
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retrying after the given attempt (0-indexed).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_secs = self.base_delay.as_secs_f64() * 2f64.powi(attempt as i32);
        let capped_secs = delay_secs.min(self.max_delay.as_secs_f64());

        let final_secs = if self.jitter {
            // Scale by 0.5..1.5 so the mean stays put but retries spread out.
            let factor = rand::rng().random_range(0.5..1.5);
            (capped_secs * factor).min(self.max_delay.as_secs_f64())
        } else {
            capped_secs
        };

        Duration::from_secs_f64(final_secs)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// runs out of attempts. A rate-limit reply with `Retry-After` overrides the
/// computed backoff.
pub async fn retry_async<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Request succeeded after {} attempts", attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt + 1 >= config.max_attempts => {
                warn!(
                    "All {} attempts exhausted. Last error: {}",
                    config.max_attempts, e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = match &e {
                    ChirperError::RateLimited {
                        retry_after_secs: Some(secs),
                        ..
                    } => Duration::from_secs(*secs).min(config.max_delay),
                    _ => config.calculate_delay(attempt),
                };
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt + 1,
                    config.max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

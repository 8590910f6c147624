// file: src/utils/retry.rs
// description: bounded exponential backoff for calls to external services
// reference: https://docs.rs/tokio/latest/tokio/time/fn.sleep.html

use crate::config::PipelineConfig;
use crate::error::Result;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }

    /// Delay before attempt `attempt` (zero-based): base, 2x base, 4x base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.saturating_pow(attempt - 1)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent. Only transient errors are retried.
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            let delay = self.delay_for(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    warn!(
                        "{} attempt {} failed: {}; retrying in {}ms",
                        operation_name,
                        attempt,
                        err,
                        self.delay_for(attempt).as_millis()
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Rate limiting and server-side failures are worth another attempt.
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

pub fn is_transient_request_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

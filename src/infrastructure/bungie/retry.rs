use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::errors::BungieApiError;

/// Bounded retry with a fixed delay between attempts
///
/// Every failure is retried until `max_attempts` calls have been made. The
/// final failure is logged and swallowed: callers get `None` and treat it as
/// "no data".
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    max_attempts: u32,
    /// Delay between consecutive attempts
    retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

impl RetryPolicy {
    /// Create a retry policy; `max_attempts` below 1 is raised to 1
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Execute an operation, retrying every failure up to the attempt bound
    ///
    /// # Arguments
    /// * `operation_name` - Label used in log lines
    /// * `operation` - Async function that returns `Result<T, BungieApiError>`
    ///
    /// # Returns
    /// * `Some(T)` - An attempt succeeded
    /// * `None` - Every attempt failed
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BungieApiError>>,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(operation = operation_name, attempt, "Request succeeded after retry");
                    }
                    return Some(result);
                }
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        transient = err.is_transient(),
                        error = %err,
                        "Request failed, retrying in {:?}",
                        self.retry_delay
                    );
                    sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Request failed after final attempt"
                    );
                    return None;
                }
            }
        }
    }
}

//! Retry policy for store failures
//!
//! Only `Store` errors are safe to retry: validation, not-found, and
//! precondition errors fail identically on every attempt. This module
//! gives callers the sanctioned retry loop, with exponential backoff,
//! keyed on each error's own retryability.
//!
//! # Example
//!
//! ```rust,no_run
//! use meridian_admin::retry::{with_store_retry, RetryConfig};
//! use meridian_entitlement::{EntitlementError, EntitlementResult};
//!
//! async fn example() -> EntitlementResult<String> {
//!     let config = RetryConfig::default();
//!
//!     with_store_retry(&config, || async {
//!         // A directory call that may fail transiently
//!         Ok("done".to_string())
//!     }).await
//! }
//! ```

use std::time::Duration;
use tokio::time::sleep;

use meridian_entitlement::EntitlementError;
use meridian_publication::PublicationError;

/// Errors that can tell retryable failures from permanent ones.
pub trait Retryable {
    /// Check if retrying this error can ever help.
    fn is_retryable(&self) -> bool;
}

impl Retryable for EntitlementError {
    fn is_retryable(&self) -> bool {
        EntitlementError::is_retryable(self)
    }
}

impl Retryable for PublicationError {
    fn is_retryable(&self) -> bool {
        PublicationError::is_retryable(self)
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Initial delay before the first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Base for exponential backoff
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Configuration with short delays for interactive console calls.
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
            exponential_base: 2.0,
        }
    }

    /// Configuration that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            exponential_base: 1.0,
        }
    }
}

/// Execute an operation, retrying only retryable failures.
///
/// Non-retryable errors are returned immediately; retryable ones are
/// reattempted with exponential backoff until `max_attempts` is reached.
///
/// # Arguments
///
/// * `config` - Retry configuration
/// * `f` - Operation to execute (must be `FnMut` and return a `Future`)
///
/// # Returns
///
/// The operation's result, or the last error once attempts are exhausted
pub async fn with_store_retry<F, Fut, T, E>(config: &RetryConfig, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Debug,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !e.is_retryable() => {
                tracing::debug!(error = ?e, "Error is not retryable, returning immediately");
                return Err(e);
            }
            Err(e) if attempt >= config.max_attempts => {
                tracing::error!(attempts = attempt, error = ?e, "All retry attempts exhausted");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    error = ?e,
                    "Attempt failed, retrying"
                );

                sleep(delay).await;

                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.exponential_base)
                        .min(config.max_delay.as_secs_f64()),
                );
            }
        }
    }
}

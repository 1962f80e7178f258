//! Retry with exponential backoff for network-bound calls.
//!
//! One higher-order function covers both the LLM providers and the league
//! data fetches: the caller supplies a classifier that decides which errors
//! are transient. Terminal errors propagate immediately; exhausting the
//! attempt budget yields a typed [`AgentError::RetryExhausted`].

use crate::error::AgentError;
use anyhow::Result;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for each subsequent delay.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// HTTP statuses worth another attempt: throttling, timeouts, 5xx.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS         // 429
        || status == StatusCode::INTERNAL_SERVER_ERROR // 500
        || status == StatusCode::BAD_GATEWAY           // 502
        || status == StatusCode::SERVICE_UNAVAILABLE   // 503
        || status == StatusCode::GATEWAY_TIMEOUT       // 504
        || status == StatusCode::REQUEST_TIMEOUT // 408
}

/// Execute an async operation with retry logic.
///
/// The `operation` closure is called repeatedly until it succeeds, returns
/// an error the classifier deems terminal, or `max_attempts` is exhausted.
pub async fn with_retry<T, F, Fut, C>(
    config: &RetryConfig,
    operation_name: &str,
    is_retryable: C,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&anyhow::Error) -> bool,
{
    let mut delay = config.initial_delay;
    let mut last_error: Option<anyhow::Error> = None;

    for attempt in 1..=config.max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if !is_retryable(&e) => {
                // Terminal error — fail immediately, no sleeping
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    "{} failed on attempt {}/{}: {}",
                    operation_name,
                    attempt,
                    config.max_attempts,
                    e
                );
                last_error = Some(e);
            }
        }

        if attempt < config.max_attempts {
            let jitter = Duration::from_millis(rand_jitter());
            let sleep_time = delay + jitter;

            tracing::info!(
                "{} retrying in {:.1}s (attempt {}/{})",
                operation_name,
                sleep_time.as_secs_f64(),
                attempt + 1,
                config.max_attempts
            );

            tokio::time::sleep(sleep_time).await;

            delay = Duration::from_secs_f64(
                (delay.as_secs_f64() * config.backoff_factor).min(config.max_delay.as_secs_f64()),
            );
        }
    }

    Err(AgentError::RetryExhausted {
        operation: operation_name.to_string(),
        attempts: config.max_attempts,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    }
    .into())
}

/// Simple jitter: random 0-500ms using timestamp as poor-man's random.
fn rand_jitter() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 500) as u64
}

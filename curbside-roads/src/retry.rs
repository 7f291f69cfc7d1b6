//! Multi-endpoint retry with per-attempt timeout

use std::future::Future;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::error::{AttemptError, FetchError};

/// Human-readable status sink. Never affects control flow.
pub type Progress<'a> = Option<&'a (dyn Fn(&str) + Send + Sync)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per endpoint
    pub max_attempts: u32,
    /// Delay before each repeat attempt on the same endpoint
    pub backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(1500),
            timeout: Duration::from_secs(25),
        }
    }
}

fn report(progress: Progress<'_>, message: &str) {
    if let Some(progress) = progress {
        progress(message);
    }
}

/// Runs `attempt` against each endpoint in order until one succeeds.
///
/// An endpoint is retried up to `policy.max_attempts` times while its errors
/// are retryable. Timeouts count as retryable failures. Any other error moves
/// on to the next endpoint straight away.
pub async fn retry_with_timeout<T, F, Fut>(
    endpoints: &[String],
    policy: &RetryPolicy,
    mut attempt: F,
    progress: Progress<'_>,
) -> Result<T, FetchError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut attempts = 0;
    let mut last_error = None;

    for (idx, endpoint) in endpoints.iter().enumerate() {
        for round in 1..=policy.max_attempts.max(1) {
            if round > 1 {
                report(
                    progress,
                    &format!("Retrying {endpoint} (attempt {round}/{})", policy.max_attempts),
                );
                tokio::time::sleep(policy.backoff).await;
            } else {
                report(progress, &format!("Requesting road data from {endpoint}"));
            }

            attempts += 1;
            let span = info_span!("attempt", endpoint = %endpoint, round);
            let outcome = tokio::time::timeout(policy.timeout, attempt(endpoint.clone()))
                .instrument(span)
                .await
                .unwrap_or(Err(AttemptError::Timeout(policy.timeout)));

            match outcome {
                Ok(value) => {
                    info!(endpoint = %endpoint, attempts, "Road data received");
                    return Ok(value);
                }
                Err(error) => {
                    warn!(endpoint = %endpoint, round, %error, "Road data request failed");
                    let retryable = error.is_retryable();
                    last_error = Some(error);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        if idx + 1 < endpoints.len() {
            debug!(endpoint = %endpoint, "Falling back to next endpoint");
            report(progress, "Server unavailable, trying another one");
        }
    }

    match last_error {
        Some(last_error) => Err(FetchError::Exhausted {
            attempts,
            last_error,
        }),
        None => Err(FetchError::NoEndpoints),
    }
}

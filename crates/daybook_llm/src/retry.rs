//! Bounded backoff for provider HTTP calls.
//!
//! A request is re-sent only on transient failures: 429, 408, 5xx, or a
//! network error. Anything else (400, 401, 403, 404) aborts immediately.
//! Attempts are bounded; there is no open-ended loop anywhere in the
//! pipeline.

use anyhow::Result;
use reqwest::{Response, StatusCode};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay before the first re-send; doubles per attempt.
    pub base_delay: Duration,
    /// Ceiling on the computed delay.
    pub delay_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
            delay_cap: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after a failed `attempt` (1-based): the base doubled per
    /// completed attempt, capped, plus sub-second jitter so identically
    /// scheduled runs do not hammer the API in lockstep.
    fn delay_after(&self, attempt: u32) -> Duration {
        let doubled = self.base_delay.saturating_mul(1u32 << (attempt - 1).min(16));
        doubled.min(self.delay_cap) + jitter()
    }
}

fn transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

// Timestamp noise is plenty for de-synchronizing daily cron schedules.
fn jitter() -> Duration {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    Duration::from_millis(u64::from(nanos % 500))
}

/// Drive `send` until it yields a success, a permanent rejection, or the
/// policy runs out of attempts. `label` names the endpoint in logs and
/// errors.
pub async fn send_with_backoff<F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    send: F,
) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<Response>>,
{
    let mut last_err = String::new();

    for attempt in 1..=policy.attempts {
        match send().await {
            Ok(resp) if resp.status().is_success() => {
                if attempt > 1 {
                    tracing::info!("{} call recovered on attempt {}", label, attempt);
                }
                return Ok(resp);
            }
            Ok(resp) if transient(resp.status()) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                last_err = format!(
                    "{status}: {}",
                    body.chars().take(200).collect::<String>()
                );
                tracing::warn!(
                    "{} transient failure ({}/{}): {}",
                    label,
                    attempt,
                    policy.attempts,
                    last_err
                );
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("{label} rejected the request ({status}): {body}");
            }
            Err(e) => {
                last_err = e.to_string();
                tracing::warn!(
                    "{} network error ({}/{}): {}",
                    label,
                    attempt,
                    policy.attempts,
                    last_err
                );
            }
        }

        if attempt < policy.attempts {
            let pause = policy.delay_after(attempt);
            tracing::debug!("{} backing off {:.1}s", label, pause.as_secs_f64());
            tokio::time::sleep(pause).await;
        }
    }

    anyhow::bail!(
        "{label} still failing after {} attempts, last error: {last_err}",
        policy.attempts
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(transient(StatusCode::REQUEST_TIMEOUT));
        assert!(transient(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!transient(StatusCode::BAD_REQUEST));
        assert!(!transient(StatusCode::UNAUTHORIZED));
        assert!(!transient(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_delay_doubles_then_caps() {
        let policy = RetryPolicy {
            attempts: 10,
            base_delay: Duration::from_secs(4),
            delay_cap: Duration::from_secs(10),
        };
        let slack = Duration::from_millis(500);
        assert!(policy.delay_after(1) >= Duration::from_secs(4));
        assert!(policy.delay_after(1) <= Duration::from_secs(4) + slack);
        assert!(policy.delay_after(2) >= Duration::from_secs(8));
        // From the third failure on, the cap holds regardless of attempt.
        for attempt in 3..10 {
            assert!(policy.delay_after(attempt) <= Duration::from_secs(10) + slack);
        }
    }
}

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::time::sleep;

const MAX_BACKOFF_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug)]
pub(crate) enum SendFailure {
    Transport(reqwest::Error),
    Api { status: StatusCode, body: String },
}

/// Posts `payload` as JSON with bearer auth, retrying transient failures
/// (429, 5xx, timeouts, connect errors) with doubling backoff.
pub(crate) async fn send_with_retry<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    payload: &T,
    policy: RetryPolicy,
) -> Result<reqwest::Response, SendFailure> {
    let max_attempts = policy.retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        let mut request = client.post(url).bearer_auth(api_key).json(payload);
        if let Some(timeout_secs) = policy.timeout_secs {
            request = request.timeout(Duration::from_secs(timeout_secs));
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if !transient_status(status) || attempt + 1 >= max_attempts {
                    return Err(SendFailure::Api { status, body });
                }
            }
            Err(source) => {
                if !transient_error(&source) || attempt + 1 >= max_attempts {
                    return Err(SendFailure::Transport(source));
                }
            }
        }

        sleep(backoff(attempt, policy.retry_delay_ms)).await;
        attempt += 1;
    }
}

fn transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn transient_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn backoff(attempt: u32, base_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::{backoff, transient_status};

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff(0, 200), Duration::from_millis(200));
        assert_eq!(backoff(1, 200), Duration::from_millis(400));
        assert_eq!(backoff(2, 200), Duration::from_millis(800));
    }

    #[test]
    fn backoff_caps_at_thirty_seconds() {
        assert_eq!(backoff(12, 500), Duration::from_millis(30_000));
        assert_eq!(backoff(63, 1), Duration::from_millis(30_000));
        assert_eq!(backoff(64, 1), Duration::from_millis(30_000));
    }

    #[test]
    fn transient_statuses_match_retry_policy() {
        assert!(transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(transient_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(transient_status(StatusCode::SERVICE_UNAVAILABLE));

        assert!(!transient_status(StatusCode::BAD_REQUEST));
        assert!(!transient_status(StatusCode::UNAUTHORIZED));
        assert!(!transient_status(StatusCode::NOT_FOUND));
    }
}

//! Resilient HTTP transport
//!
//! One pooled `reqwest::Client` plus a fixed retry policy, built once at startup
//! and shared by every batch. Server overload (500/502/503/504), connect
//! failures and timeouts are retried with exponential backoff; anything else
//! fails immediately.

use crate::error::{CliError, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Retry Policy Constants
// ============================================================================

/// Retries after the first attempt before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Delay before the first retry; doubled for each further retry
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 100;

/// Upper bound on any single delay
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 120;

/// Statuses that mean "try again later"
pub const DEFAULT_RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// When and how long to wait before retrying a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            backoff_max: Duration::from_secs(DEFAULT_BACKOFF_MAX_SECS),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the given retry (1-based): `base * 2^(retry - 1)`, capped
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_base
            .checked_mul(factor)
            .unwrap_or(self.backoff_max)
            .min(self.backoff_max)
    }

    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }
}

/// Why an attempt is worth repeating
struct TransientFailure {
    reason: String,
    retry_after: Option<Duration>,
}

/// Pooled HTTP client with a fixed retry policy
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    policy: RetryPolicy,
}

impl Transport {
    /// Build the transport; the policy cannot change afterwards
    pub fn new(policy: RetryPolicy, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, policy })
    }

    /// POST a form-encoded body and return the response text
    ///
    /// Transient failures are retried according to the policy. Once the budget
    /// is spent the last failure is reported as [`CliError::TransportExhausted`].
    pub async fn post_form<T>(&self, url: &str, form: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let failure = match self.client.post(url).form(form).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        debug!(attempt, status = %status, "Lookup request succeeded");
                        return Ok(response.text().await?);
                    }

                    if !self.policy.is_retryable(status) {
                        return Err(CliError::HttpStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let retry_after = if status == StatusCode::SERVICE_UNAVAILABLE {
                        retry_after(response.headers())
                    } else {
                        None
                    };

                    TransientFailure {
                        reason: format!("HTTP {}", status),
                        retry_after,
                    }
                },
                Err(e) if e.is_connect() || e.is_timeout() => TransientFailure {
                    reason: e.to_string(),
                    retry_after: None,
                },
                Err(e) => return Err(e.into()),
            };

            if attempt >= self.policy.max_attempts() {
                return Err(CliError::TransportExhausted {
                    attempts: attempt,
                    reason: failure.reason,
                });
            }

            let delay = failure
                .retry_after
                .map(|d| d.min(self.policy.backoff_max))
                .unwrap_or_else(|| self.policy.delay_for(attempt));

            warn!(
                attempt,
                max_attempts = self.policy.max_attempts(),
                reason = %failure.reason,
                delay_ms = delay.as_millis() as u64,
                "Transient lookup failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// `Retry-After` given in whole seconds; HTTP-date values are ignored
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use wiremock::{
        matchers::{body_string, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base: Duration::from_millis(1),
            ..RetryPolicy::default()
        }
    }

    fn transport(policy: RetryPolicy) -> Transport {
        Transport::new(policy, Duration::from_secs(5), "precalc-test").unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.max_attempts(), 6);
        assert!(policy.is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(policy.is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!policy.is_retryable(StatusCode::NOT_FOUND));
        assert!(!policy.is_retryable(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        let delays: Vec<u128> = (1..=5).map(|r| policy.delay_for(r).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1600]);
    }

    #[test]
    fn test_backoff_capped() {
        let policy = RetryPolicy {
            backoff_max: Duration::from_millis(300),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
        assert_eq!(policy.delay_for(64), Duration::from_millis(300));
    }

    #[test]
    fn test_retry_after_seconds_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }

    #[tokio::test]
    async fn test_post_form_sends_repeated_pairs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/matches/"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("md5=AAA&md5=BBB"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport(fast_policy(0))
            .post_form(
                &format!("{}/matches/", server.uri()),
                &[("md5", "AAA"), ("md5", "BBB")],
            )
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_transient_status_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport(fast_policy(5))
            .post_form(&server.uri(), &[("md5", "AAA")])
            .await
            .unwrap();
        assert_eq!(body, "recovered");
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(4)
            .mount(&server)
            .await;

        let err = transport(fast_policy(3))
            .post_form(&server.uri(), &[("md5", "AAA")])
            .await
            .unwrap_err();

        match err {
            CliError::TransportExhausted { attempts, reason } => {
                assert_eq!(attempts, 4);
                assert!(reason.contains("502"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = transport(fast_policy(5))
            .post_form(&server.uri(), &[("md5", "AAA")])
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_retried_then_exhausted() {
        // Bind then drop a listener so the port is very likely closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = transport(fast_policy(2))
            .post_form(&format!("http://127.0.0.1:{}/", port), &[("md5", "AAA")])
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::TransportExhausted { attempts: 3, .. }));
    }
}

//! HTTP transport with request timeout and bounded retries

use crate::auth::SessionToken;
use crate::error::{ClientError, ClientResult};
use crate::JSON_API;
use backoff::ExponentialBackoffBuilder;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Retry behaviour for resource requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Upper bound for any single delay
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Statuses worth another attempt
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Shared HTTP client used by every stage
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be built
    pub fn new(timeout: Duration, retry: RetryPolicy) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, retry })
    }

    /// POST a form body once, without retries
    ///
    /// # Errors
    /// Returns an error on transport failure
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> ClientResult<Response> {
        tracing::debug!(url, "POST");
        Ok(self.client.post(url).form(form).send().await?)
    }

    /// GET a JSON:API resource with bearer auth
    ///
    /// Transport errors, 429 and 5xx responses are retried with exponential
    /// backoff until `max_attempts` is reached; the last response is handed
    /// back even if it is still a failure so the caller can inspect it.
    ///
    /// # Errors
    /// Returns an error if the final attempt fails at the transport level
    pub async fn get(
        &self,
        url: &str,
        token: &SessionToken,
        query: &[(String, String)],
    ) -> ClientResult<Response> {
        let max_attempts = self.retry.max_attempts.max(1);
        let attempts = AtomicU32::new(0);
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry.initial_interval)
            .with_max_interval(self.retry.max_interval)
            .with_max_elapsed_time(None)
            .build();

        let client = &self.client;
        let attempts = &attempts;
        backoff::future::retry(policy, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(url, attempt, "GET");

            let result = client
                .get(url)
                .bearer_auth(token.expose())
                .header(ACCEPT, JSON_API)
                .query(query)
                .send()
                .await;

            match result {
                Ok(response) if attempt < max_attempts && is_retryable(response.status()) => {
                    let status = response.status();
                    tracing::warn!(url, %status, attempt, "Retrying request");
                    Err(backoff::Error::transient(ClientError::Status {
                        status: status.as_u16(),
                        body: String::new(),
                    }))
                }
                Ok(response) => Ok(response),
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(url, error = %e, attempt, "Retrying request");
                    Err(backoff::Error::transient(ClientError::Http(e)))
                }
                Err(e) => Err(backoff::Error::permanent(ClientError::Http(e))),
            }
        })
        .await
    }
}

/*!
 * Resilient request execution.
 *
 * [`RequestExecutor::execute`] runs one logical request as a pipeline:
 * per-attempt timeout, status classification, then the retry loop with
 * exponential backoff. Caller cancellation is checked at every suspension
 * point and always wins over a pending retry.
 */

use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::backoff::BackoffPolicy;
use super::classify::{ClassifiedOutcome, StatusContext, classify};
use super::request::{HttpRequest, HttpResponse};
use super::transport::Transport;
use crate::errors::{DeepLError, Result};

/// Timeout and retry budget for a single logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Time allowed for each individual attempt
    pub per_attempt_timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            per_attempt_timeout: Duration::from_secs(10),
            max_retries: 5,
        }
    }
}

/// Sends API requests through a transport, retrying transient failures
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    server_url: Url,
    headers: Vec<(String, String)>,
    retry: RetryConfig,
    backoff: BackoffPolicy,
}

impl RequestExecutor {
    /// Create an executor
    ///
    /// `headers` are attached to every request sent through it.
    pub fn new(
        transport: Arc<dyn Transport>,
        server_url: Url,
        headers: Vec<(String, String)>,
        retry: RetryConfig,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            transport,
            server_url,
            headers,
            retry,
            backoff,
        }
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// Execute a request, returning the first successful response
    ///
    /// Transport failures, 429 and 5xx other than 503 are retried up to
    /// `max_retries` times; once exhausted the last transient error is
    /// returned. Every other error status is returned immediately.
    pub async fn execute(
        &self,
        request: &HttpRequest,
        context: StatusContext,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        let url = self.resolve(&request.path)?;
        let mut prepared = request.clone();
        prepared.headers = self
            .headers
            .iter()
            .cloned()
            .chain(request.headers.iter().cloned())
            .collect();

        let total_attempts = self.retry.max_retries + 1;
        let mut attempt = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(DeepLError::Cancelled);
            }

            debug!(
                "{} {} (attempt {}/{})",
                prepared.method, prepared.path, attempt, total_attempts
            );

            let transient = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeepLError::Cancelled),
                sent = tokio::time::timeout(
                    self.retry.per_attempt_timeout,
                    self.transport.send(url.clone(), &prepared),
                ) => match sent {
                    Err(_) => DeepLError::Connection(format!(
                        "request timed out after {:?}",
                        self.retry.per_attempt_timeout
                    )),
                    Ok(Err(transport_error)) => DeepLError::Connection(transport_error.to_string()),
                    Ok(Ok(response)) => match classify(response.status, &response.body, context) {
                        ClassifiedOutcome::Success => return Ok(response),
                        ClassifiedOutcome::Terminal { kind, message } => {
                            return Err(kind.into_error(message));
                        }
                        ClassifiedOutcome::Retryable { kind, message } => kind.into_error(message),
                    },
                },
            };

            if attempt >= total_attempts {
                error!(
                    "{} {} failed after {} attempts: {}",
                    prepared.method, prepared.path, attempt, transient
                );
                return Err(transient);
            }

            let delay = self.backoff.delay(attempt);
            warn!(
                "{} {} attempt {}/{} failed: {}; retrying in {:?}",
                prepared.method, prepared.path, attempt, total_attempts, transient, delay
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeepLError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        // server_url always ends with '/', so a relative join keeps any path prefix
        self.server_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DeepLError::InvalidArgument(format!("invalid request path '{}': {}", path, e)))
    }
}

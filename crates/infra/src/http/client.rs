use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("busysync/", env!("CARGO_PKG_VERSION"));

/// HTTP client with built-in retry and timeout support.
///
/// Only idempotent requests (GET, HEAD, PUT, DELETE, OPTIONS) are retried. A POST that
/// timed out may still have been applied upstream; replaying it could create
/// the same calendar event twice.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, InfraError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn get<U: reqwest::IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post<U: reqwest::IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn delete<U: reqwest::IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Responses are returned whatever their status; use [`ensure_success`]
    /// to turn an error status into an [`InfraError::Status`].
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, InfraError> {
        let request = builder.build()?;
        let attempts = if is_idempotent(request.method()) { self.max_attempts.max(1) } else { 1 };
        let method = request.method().clone();
        let url = redacted_url(request.url());

        for attempt in 0..attempts {
            let request = request.try_clone().ok_or_else(|| {
                InfraError::Config(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if status.is_server_error() && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(
                        attempt = attempt + 1,
                        %method,
                        %url,
                        error = %err,
                        "HTTP request failed"
                    );

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(err.into());
                }
            }
        }

        Err(InfraError::Request("http client exhausted retries without producing a result".into()))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Pass successful responses through; turn anything else into
/// [`InfraError::Status`] carrying the response body.
pub async fn ensure_success(response: Response) -> Result<Response, InfraError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    Err(InfraError::Status { status: status.as_u16(), body })
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn build(self) -> Result<HttpClient, InfraError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::DELETE | Method::PUT | Method::OPTIONS)
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

// Query strings never carry credentials here, but keep logs to scheme, host
// and path anyway.
fn redacted_url(url: &reqwest::Url) -> String {
    format!("{}://{}{}", url.scheme(), url.host_str().unwrap_or("-"), url.path())
}

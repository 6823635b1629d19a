//! HTTP transport for the product catalogue
//!
//! The fetcher talks to the network only through the [`Transport`] trait so
//! that its retry behaviour can be exercised without a live server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Identifying header sent with every request
pub const USER_AGENT: &str = "PaintPriceSheetGenerator/1.0";

/// Upper bound on a single request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status code the catalogue uses to signal rate limiting
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Failures of a single request attempt, other than rate limiting
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS or timeout failure
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with an error status other than rate limiting
    #[error("Server answered with HTTP {0}")]
    Status(u16),

    /// Failure reported by a non-reqwest transport
    #[error("{0}")]
    Other(String),
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == STATUS_TOO_MANY_REQUESTS
    }
}

/// Issues a GET request and returns whatever status the server answered with
///
/// Implementations must not treat error statuses as failures: classifying
/// statuses is the fetcher's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared reqwest [`Client`]
///
/// The client pools connections, so a single `HttpTransport` should be reused
/// for a whole batch.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client with the identifying user agent and [`REQUEST_TIMEOUT`]
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Builds a client with the identifying user agent and a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

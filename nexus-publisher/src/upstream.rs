//! Outbound HTTP access to the remote artifact repository.
//!
//! The publish pipeline only ever needs one operation, "PUT these bytes at
//! this URL", which is captured by the [`RemoteRepository`] trait. The
//! production implementation is [`UpstreamClient`], a thin wrapper around a
//! shared `reqwest::Client`; tests plug in recording doubles.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, warn};

use crate::{AppError, AppResult};

/// Basic-auth credentials for one request. The password never appears in
/// `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Blank usernames mean "send no Authorization header".
    pub fn is_anonymous(&self) -> bool {
        self.username.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Status and body of a completed remote call, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response (DNS, connect, TLS, timeout).
#[derive(Debug, thiserror::Error)]
#[error("request to {url} failed: {message}")]
pub struct TransportError {
    pub url: String,
    pub message: String,
}

/// Store bytes at a URL on the remote repository.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Upload `body` to `url`. Any HTTP response, including 4xx/5xx, is
    /// returned as `Ok`; only transport failures are errors.
    async fn put(
        &self,
        url: &str,
        body: Bytes,
        content_type: &str,
        credentials: &Credentials,
    ) -> Result<RemoteResponse, TransportError>;
}

/// Settings for the outbound HTTP client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// User agent sent with every upload
    pub user_agent: String,
    /// Whole-request timeout; `None` keeps the client default (no timeout)
    pub timeout: Option<Duration>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("nexus-publisher/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }
}

/// `reqwest`-backed [`RemoteRepository`].
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Create a new upstream client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn new(config: UpstreamConfig) -> AppResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteRepository for UpstreamClient {
    async fn put(
        &self,
        url: &str,
        body: Bytes,
        content_type: &str,
        credentials: &Credentials,
    ) -> Result<RemoteResponse, TransportError> {
        debug!(url = %url, size = body.len(), content_type = %content_type, "PUT to remote repository");

        let mut request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body);
        if !credentials.is_anonymous() {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Remote repository unreachable");
            TransportError {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        // A body that cannot be read is not worth failing a finished upload over.
        let body = response.text().await.unwrap_or_default();
        debug!(url = %url, status, "Remote repository responded");

        Ok(RemoteResponse { status, body })
    }
}

//! Resume Match HTTP client

use reqwest::{RequestBuilder, Response};
use resume_match_core::error::{AppError, Result};
use resume_match_core::port::RemoteCallError;
use std::time::Duration;
use tracing::debug;

/// Backend root used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// One pooled client for every backend endpoint
///
/// A single instance is shared (behind `Arc`) as the upload, match, history
/// and auth adapter. No retries: every failure is returned to the caller.
///
/// # Example
///
/// ```no_run
/// use resume_match_infra_http::{HttpClientConfig, ResumeMatchHttpClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ResumeMatchHttpClient::new(HttpClientConfig::default())?;
/// assert_eq!(client.base_url(), "http://localhost:8080/api");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResumeMatchHttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl ResumeMatchHttpClient {
    /// Build the client
    ///
    /// # Errors
    /// - `AppError::Config` if the base URL does not parse or the TLS
    ///   backend cannot be initialized
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("Invalid api.base_url '{}': {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send and reject non-2xx answers
    pub(crate) async fn send(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> std::result::Result<Response, RemoteCallError> {
        debug!(endpoint, "Sending request");
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(endpoint, status = status.as_u16(), "Request rejected");
            return Err(RemoteCallError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

pub(crate) fn transport_error(endpoint: &str, err: &reqwest::Error) -> RemoteCallError {
    let message = if err.is_timeout() {
        "timed out".to_string()
    } else {
        err.to_string()
    };
    RemoteCallError::Transport {
        endpoint: endpoint.to_string(),
        message,
    }
}

pub(crate) fn decode_error(endpoint: &str, err: impl std::fmt::Display) -> RemoteCallError {
    RemoteCallError::Decode {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

//! HTTP client for the checkpoint validation service.
//!
//! Each tag is checked with a single request to `<base-url>/<tag>`, the tag
//! percent-encoded as one path segment. There is no body and no retry: a tag
//! that cannot be validated within the timeout is a rejection, and the reader
//! can simply be presented again.
//!
//! # Architecture
//!
//! ```text
//! TagProcessor
//!     │
//!     └─> ValidationClient ───(HTTP)───> checkpoint service
//!             │
//!             └─> classify_response (status + body -> accepted?)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use smartsub_core::{ApiConfig, Tag};
//! use smartsub_network::{TagValidator, ValidationClient, ValidationClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ValidationClientConfig::from(&ApiConfig::default());
//! let client = ValidationClient::new(config)?;
//!
//! let tag = Tag::new("E2003412")?;
//! if client.validate(&tag).await {
//!     println!("{tag} accepted");
//! }
//! # Ok(())
//! # }
//! ```

use crate::classify::classify_response;
use crate::validator::TagValidator;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use smartsub_core::constants::BODY_EXCERPT_CHARS;
use smartsub_core::{ApiConfig, HttpMethod, Tag};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration for the validation client.
///
/// # Example
///
/// ```
/// use smartsub_network::ValidationClientConfig;
/// use smartsub_core::HttpMethod;
/// use std::time::Duration;
///
/// let config = ValidationClientConfig {
///     base_url: "http://127.0.0.1:9062/api/checkpoint-posto".to_string(),
///     method: HttpMethod::Get,
///     timeout: Duration::from_millis(500),
///     ..ValidationClientConfig::default()
/// };
/// assert!(config.headers.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ValidationClientConfig {
    /// Base URL; the encoded tag is appended as the last path segment.
    pub base_url: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// Whole-request timeout (connect, send, and read the body).
    pub timeout: Duration,

    /// Static headers sent with every request.
    pub headers: BTreeMap<String, String>,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for ValidationClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ValidationClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            method: api.method,
            timeout: api.timeout(),
            headers: api.headers.clone(),
            use_system_proxy: api.use_system_proxy,
        }
    }
}

/// Errors that can occur while checking a tag.
#[derive(Debug, Error)]
pub enum ValidationClientError {
    /// A configured header name or value is not valid HTTP.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The underlying HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Build(#[source] reqwest::Error),

    /// The request did not complete within the timeout.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Connection, protocol, or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outcome of one request, before it collapses to a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResponse {
    /// HTTP status code.
    pub status: u16,

    /// Full response body.
    pub body: String,

    /// Classification of status and body.
    pub accepted: bool,
}

/// HTTP client for the checkpoint validation service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ValidationClient {
    http: reqwest::Client,
    base_url: String,
    method: HttpMethod,
    timeout: Duration,
}

impl ValidationClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` for a header that cannot be sent, or `Build` if
    /// the TLS backend fails to initialize.
    pub fn new(config: ValidationClientConfig) -> Result<Self, ValidationClientError> {
        let headers = header_map(&config.headers)?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(ValidationClientError::Build)?;

        debug!(
            base_url = %config.base_url,
            method = %config.method,
            timeout_ms = config.timeout.as_millis() as u64,
            "Validation client ready"
        );

        Ok(Self {
            http,
            base_url: config.base_url,
            method: config.method,
            timeout: config.timeout,
        })
    }

    /// Full request URL for `tag`.
    ///
    /// # Example
    ///
    /// ```
    /// use smartsub_core::Tag;
    /// use smartsub_network::{ValidationClient, ValidationClientConfig};
    ///
    /// let config = ValidationClientConfig {
    ///     base_url: "http://host/api/checkpoint-posto/".to_string(),
    ///     ..ValidationClientConfig::default()
    /// };
    /// let client = ValidationClient::new(config).unwrap();
    /// let tag = Tag::new("AB-12").unwrap();
    /// assert_eq!(client.url_for(&tag), "http://host/api/checkpoint-posto/AB-12");
    /// ```
    pub fn url_for(&self, tag: &Tag) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(tag.as_str())
        )
    }

    /// Send the request for `tag` and classify the response.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` when the timeout elapses, or `Http` for any other
    /// transport failure. A non-2xx status is not an error; it classifies as
    /// rejected.
    pub async fn check(&self, tag: &Tag) -> Result<ValidationResponse, ValidationClientError> {
        let url = self.url_for(tag);
        let request = match self.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        debug!(
            %tag,
            status,
            body = %excerpt(&body),
            "Validation response"
        );

        let accepted = classify_response(status, &body);
        Ok(ValidationResponse {
            status,
            body,
            accepted,
        })
    }

    fn map_error(&self, error: reqwest::Error) -> ValidationClientError {
        if error.is_timeout() {
            ValidationClientError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ValidationClientError::Http(error)
        }
    }
}

impl TagValidator for ValidationClient {
    /// Collapses every failure to `false`; callers only ever see a verdict.
    async fn validate(&self, tag: &Tag) -> bool {
        info!(%tag, "Validating tag");
        match self.check(tag).await {
            Ok(response) => response.accepted,
            Err(e) => {
                warn!(%tag, error = %e, "Validation request failed");
                false
            }
        }
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ValidationClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = |reason: String| ValidationClientError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

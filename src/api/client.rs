//! # API Client Core
//!
//! This module contains the main ApiClient structure and HTTP client functionality
//! that is shared across all scanning service endpoints.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Url};

use crate::models::ScanId;
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the API key, when one is configured.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Header carrying the per-client trace id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Error types for API operations.
///
/// Transport failures and unparseable bodies are kept apart here so logs can
/// tell them apart; the session layer reports both as network errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network error (connection failed, DNS error, timeout, etc.)
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
    },

    /// The service answered with a non-success status
    #[error("Server returned {status}: {message}")]
    BadStatus {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Response parsing error
    #[error("Failed to parse response: {message}")]
    Malformed {
        /// Human-readable error message
        message: String,
    },
}

impl ApiError {
    /// HTTP status, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// HTTP client for the VibeGuard scanning service
///
/// # Example
///
/// ```rust
/// use vibeguard::api::ApiClient;
///
/// let client = ApiClient::new("http://localhost:8000".to_string())
///     .with_api_key(Some("vg_test_key".to_string()));
/// assert!(client.has_api_key());
/// ```
pub struct ApiClient {
    /// Base URL for the API (e.g., <http://localhost:8000>)
    pub base_url: String,
    /// Underlying HTTP client
    pub client: Client,
    /// Trace ID sent as `X-Request-ID` on every call
    pub trace_id: String,
    api_key: Option<String>,
}

/// Version of the CLI, used in User-Agent header
const VERSION: &str = env!("CARGO_PKG_VERSION");

impl ApiClient {
    /// Create a new unauthenticated API client
    ///
    /// The client is configured with:
    /// - User-Agent: `vibeguard/<version>`
    /// - Accept: `application/json`
    /// - X-Request-ID: a trace id unique to this client
    ///
    /// Content-Type is set per request (JSON or multipart).
    pub fn new(base_url: String) -> Self {
        let trace_id = generate_trace_id();

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("vibeguard/{VERSION}"))
                .unwrap_or_else(|_| HeaderValue::from_static("vibeguard/0.1.0")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            headers.insert(REQUEST_ID_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            trace_id,
            api_key: None,
        }
    }

    /// Attach an API key. Blank keys mean the deployment is unauthenticated.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get the trace ID for this client session.
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Absolute URL for an endpoint path such as `/scans`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one stored scan. The id is escaped as a single path segment.
    pub fn scan_url(&self, id: &ScanId) -> Result<Url, ApiError> {
        let invalid = || ApiError::Network {
            message: format!("Invalid base URL: {}", self.base_url),
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("scans")
            .push(id.as_str());
        Ok(url)
    }

    /// Add the `X-API-Key` header when a key is configured.
    pub(crate) fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

/// Generate a 128-bit trace ID as a 32-character hex string.
fn generate_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

//! Error taxonomy for API calls.

use std::fmt;

use serde_json::Value;

/// Categories of API errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced a response (DNS, TLS, connection reset).
    Network,
    /// Non-2xx response from the server.
    HttpStatus,
    /// 2xx response whose body is not the expected JSON envelope.
    InvalidResponseFormat,
    /// Input rejected before any request was made.
    Validation,
    /// Durable session storage could not be written.
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::InvalidResponseFormat => write!(f, "invalid_response_format"),
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::Storage => write!(f, "storage"),
        }
    }
}

/// Structured error from an API call with kind and details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Optional additional details (e.g., raw response body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        if !details.is_empty() {
            self.details = Some(details);
        }
        self
    }

    pub fn network(err: &reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Network, format!("Network error: {err}"))
    }

    /// Creates an HTTP status error.
    ///
    /// The message comes from the body's `message` field, then its `error`
    /// field, and falls back to `HTTP error! status: N`.
    pub fn http_status(status: u16, body: Option<&Value>) -> Self {
        let message = body
            .and_then(|json| server_message(json, "message").or_else(|| server_message(json, "error")))
            .map_or_else(|| format!("HTTP error! status: {status}"), str::to_string);

        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            status: Some(status),
            details: None,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidResponseFormat, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn storage(err: &anyhow::Error) -> Self {
        Self::new(
            ApiErrorKind::Storage,
            format!("Failed to save session: {err:#}"),
        )
    }

    /// True when the server rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::HttpStatus && self.status == Some(401)
    }
}

fn server_message<'a>(json: &'a Value, field: &str) -> Option<&'a str> {
    json.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

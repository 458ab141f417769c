//! Error types for Octopus Deploy operations.
//!
//! Every layer of the request pipeline reports through [`Error`]. Failures from
//! lower layers propagate unchanged; only a well-formed non-success response
//! from the server becomes [`Error::Api`].

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for Octopus Deploy operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid client configuration (credential, server URL, TLS settings)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration failed field validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Octopus server could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A body could not be serialized or deserialized as JSON
    #[error("Failed to decode JSON: {0}")]
    Decode(String),

    /// A relative URI could not be turned into a request URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The Octopus API answered with an unexpected status code
    #[error(
        "{context} failed with status code {status}: {message}{}",
        format_details(.details)
    )]
    Api {
        /// What the caller was doing, e.g. `Request to retrieve machine 'Machines-1'`
        context: String,
        /// HTTP status code returned by the server
        status: u16,
        /// `ErrorMessage` from the response envelope
        message: String,
        /// `Errors` from the response envelope
        details: Vec<String>,
    },
}

/// Specialized result type for Octopus Deploy operations.
pub type Result<T> = std::result::Result<T, Error>;

fn format_details(details: &[String]) -> String {
    if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join("; "))
    }
}

impl Error {
    /// Build an [`Error::Api`] from its parts.
    #[must_use]
    pub fn api(
        context: impl Into<String>,
        status: StatusCode,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self::Api {
            context: context.into(),
            status: status.as_u16(),
            message: message.into(),
            details,
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Decode(_) => "DECODE_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::Api { .. } => "API_ERROR",
        }
    }

    /// Returns the HTTP status code carried by an [`Error::Api`].
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => StatusCode::from_u16(*status).ok(),
            _ => None,
        }
    }

    /// Returns true for an API error with status 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns true if the failure happened before a response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::HttpError(_) | Self::Timeout(_) | Self::ServiceUnavailable(_)
        )
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(self, Self::ConfigError(_) | Self::Decode(_))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

//! Error types for portal operations.
//!
//! Protocol-level rejections (wrong status on a hop, missing `Location`,
//! refused credentials, hop budget exhausted) are not errors: the owning
//! authentication call reports them as `Ok(false)`. `PortalError` carries
//! everything else, mostly transport faults and malformed responses.

use std::fmt;
use thiserror::Error;

/// The category of a portal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalErrorCode {
    /// Authentication failed or the session is not in a usable state.
    AuthenticationFailed,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Server returned an error (5xx status codes).
    ServerError,
    /// Invalid response from the server - parse error, unexpected format.
    InvalidResponse,
    /// The embedded public key blob could not be parsed.
    KeyFormat,
    /// Configuration error - missing or invalid config.
    ConfigurationError,
    /// Internal error - unexpected state, bug.
    InternalError,
}

impl PortalErrorCode {
    /// Returns true if this error is transient and the operation may be
    /// retried. Nothing in this crate retries on its own; this is advisory
    /// classification for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::ServerError)
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::KeyFormat => "key_format",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for PortalErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to one of the campus services.
#[derive(Debug, Error)]
pub struct PortalError {
    /// The error code categorizing this error.
    code: PortalErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The service that generated this error (e.g. "cas", "academic").
    service: Option<String>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PortalError {
    /// Creates a new portal error with the given code and message.
    pub fn new(code: PortalErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            service: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::NetworkError, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::InvalidResponse, message)
    }

    /// Creates a key format error.
    pub fn key_format(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::KeyFormat, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::InternalError, message)
    }

    /// Sets the service name for this error.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> PortalErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the service name, if set.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref service) = self.service {
            write!(f, "[{}] ", service)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() || err.is_connect() {
            PortalErrorCode::NetworkError
        } else if err.is_decode() {
            PortalErrorCode::InvalidResponse
        } else {
            PortalErrorCode::NetworkError
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

/// A specialized Result type for portal operations.
pub type PortalResult<T> = Result<T, PortalError>;

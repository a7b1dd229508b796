//! Client error types.

use std::fmt;

use campass_portal::PortalError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Portal operation failed.
    Portal(PortalError),
    /// Login or service bridge rejected.
    Auth(String),
    /// IO error.
    Io(std::io::Error),
    /// A listing lacked the requested item.
    NotFound(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Portal(err) => write!(f, "portal error: {}", err),
            Self::Auth(msg) => write!(f, "authentication failed: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::NotFound(msg) => write!(f, "not found: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Portal(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PortalError> for ClientError {
    fn from(err: PortalError) -> Self {
        Self::Portal(err)
    }
}

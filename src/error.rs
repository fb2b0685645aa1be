//! Error taxonomy shared by the client and both bridges.

use crate::endpoint::EndpointError;
use serde::Serialize;

/// Stable failure category that callers can branch on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    ConfigurationError,
    NotInitialized,
    AlreadyInitialized,
    InvalidArgument,
    EndpointUnavailable,
    ProtocolViolation,
}

impl ErrorKind {
    /// The stable code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationError => "ConfigurationError",
            ErrorKind::NotInitialized => "NotInitialized",
            ErrorKind::AlreadyInitialized => "AlreadyInitialized",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::EndpointUnavailable => "EndpointUnavailable",
            ErrorKind::ProtocolViolation => "ProtocolViolation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the runtime client and the bridges.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The endpoint address is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation was invoked before the client was initialized.
    #[error("client not initialized")]
    NotInitialized,

    /// Initialization was invoked a second time.
    #[error("client already initialized")]
    AlreadyInitialized,

    /// Wrong argument count or shape at a bridge entry point.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The Runtime API call did not succeed.
    #[error("runtime endpoint unavailable: {0}")]
    EndpointUnavailable(#[from] EndpointError),

    /// A call pattern broke the one-invocation-at-a-time contract.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl RuntimeError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RuntimeError::InvalidArgument(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        RuntimeError::Configuration(message.into())
    }

    /// The stable failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::Configuration(_) => ErrorKind::ConfigurationError,
            RuntimeError::NotInitialized => ErrorKind::NotInitialized,
            RuntimeError::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            RuntimeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RuntimeError::EndpointUnavailable(_) => ErrorKind::EndpointUnavailable,
            RuntimeError::ProtocolViolation(_) => ErrorKind::ProtocolViolation,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_are_stable() {
        assert_eq!(RuntimeError::NotInitialized.kind().as_str(), "NotInitialized");
        assert_eq!(
            RuntimeError::configuration("empty").kind(),
            ErrorKind::ConfigurationError
        );
        assert_eq!(
            RuntimeError::from(EndpointError::Status(502)).kind().to_string(),
            "EndpointUnavailable"
        );
    }

    #[test]
    fn test_display_includes_message() {
        let err = RuntimeError::invalid_argument("Wrong arguments");
        assert_eq!(err.to_string(), "invalid argument: Wrong arguments");
    }
}

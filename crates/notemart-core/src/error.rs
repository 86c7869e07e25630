//! Error types for notemart.

use thiserror::Error;

use crate::models::NoteSource;

/// Result type alias using notemart's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notemart operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A note source could not produce results (transport failure,
    /// non-success status, undecodable payload, or timeout)
    #[error("{origin} source unavailable: {reason}")]
    SourceUnavailable { origin: NoteSource, reason: String },

    /// Caller supplied an argument outside its allowed range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a failure of the local note store.
    pub fn local_unavailable(reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            origin: NoteSource::Local,
            reason: reason.into(),
        }
    }

    /// Shorthand for a failure of the external record repository.
    pub fn external_unavailable(reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            origin: NoteSource::External,
            reason: reason.into(),
        }
    }

    /// Whether this error describes a degraded source rather than a caller mistake.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable { .. } | Error::Database(_) | Error::Request(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_source_unavailable() {
        let err = Error::SourceUnavailable {
            origin: NoteSource::External,
            reason: "HTTP 503".to_string(),
        };
        assert_eq!(err.to_string(), "external source unavailable: HTTP 503");
    }

    #[test]
    fn test_error_display_invalid_argument() {
        let err = Error::InvalidArgument("limit must be >= 1".to_string());
        assert_eq!(err.to_string(), "Invalid argument: limit must be >= 1");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing base url".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing base url");
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_local_unavailable_helper() {
        let err = Error::local_unavailable("pool timed out");
        match err {
            Error::SourceUnavailable { origin, reason } => {
                assert_eq!(origin, NoteSource::Local);
                assert_eq!(reason, "pool timed out");
            }
            _ => panic!("Expected SourceUnavailable error"),
        }
    }

    #[test]
    fn test_is_source_failure() {
        assert!(Error::external_unavailable("down").is_source_failure());
        assert!(Error::Request("reset".to_string()).is_source_failure());
        assert!(!Error::InvalidArgument("limit".to_string()).is_source_failure());
        assert!(!Error::Config("bad".to_string()).is_source_failure());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}

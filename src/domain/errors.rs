//! Domain error types
//!
//! This module defines the error hierarchy for CASL.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main CASL error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CaslError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote catalogue errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Code mapping table errors
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Result sink errors
    #[error("Output error: {0}")]
    Output(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors returned by the source and target fetchers
///
/// The set is closed: every HTTP, transport and decoding failure a fetcher
/// can hit is classified into one of these variants before it leaves the
/// adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The identifier is unknown to the remote system
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote system throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The remote system refused the request (4xx)
    #[error("Request rejected: {status} - {message}")]
    RemoteRejected { status: u16, message: String },

    /// The remote system failed (5xx)
    #[error("Server error: {status} - {message}")]
    RemoteServerError { status: u16, message: String },

    /// Connection, timeout or body transfer failure
    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// The response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The batch was cancelled before the call completed
    #[error("Cancelled")]
    Cancelled,
}

impl FetchError {
    /// Short stable label used in logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "not_found",
            FetchError::RateLimited(_) => "rate_limited",
            FetchError::RemoteRejected { .. } => "remote_rejected",
            FetchError::RemoteServerError { .. } => "remote_server_error",
            FetchError::TransientNetwork(_) => "transient_network",
            FetchError::Decode(_) => "decode",
            FetchError::Cancelled => "cancelled",
        }
    }

    /// Whether the dispatcher may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::RateLimited(_))
    }
}

/// Convenience alias for fetcher results
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Conversion from std::io::Error
impl From<std::io::Error> for CaslError {
    fn from(err: std::io::Error) -> Self {
        CaslError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CaslError {
    fn from(err: toml::de::Error) -> Self {
        CaslError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for CaslError {
    fn from(err: csv::Error) -> Self {
        CaslError::Serialization(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casl_error_display() {
        let err = CaslError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_fetch_error_conversion() {
        let fetch_err = FetchError::TransientNetwork("connection reset".to_string());
        let casl_err: CaslError = fetch_err.into();
        assert!(matches!(casl_err, CaslError::Fetch(_)));
    }

    #[test]
    fn test_fetch_error_kind() {
        assert_eq!(FetchError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(
            FetchError::RemoteServerError {
                status: 503,
                message: "ROUTING_ERROR".into()
            }
            .kind(),
            "remote_server_error"
        );
        assert_eq!(FetchError::Cancelled.kind(), "cancelled");
    }

    #[test]
    fn test_only_rate_limit_is_retryable() {
        assert!(FetchError::RateLimited("PER_SECOND_THRESHOLD".into()).is_retryable());
        assert!(!FetchError::TransientNetwork("timeout".into()).is_retryable());
        assert!(!FetchError::RemoteRejected {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let casl_err: CaslError = io_err.into();
        assert!(matches!(casl_err, CaslError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let casl_err: CaslError = toml_err.into();
        assert!(matches!(casl_err, CaslError::Configuration(_)));
        assert!(casl_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_fetch_error_implements_std_error() {
        let err = FetchError::Decode("bad xml".to_string());
        let _: &dyn std::error::Error = &err;
    }
}

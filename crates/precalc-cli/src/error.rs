//! Error types for the precalc CLI
//!
//! Every variant carries a message a user can act on. Transient server failures
//! never show up here directly: the transport retries them and only reports
//! [`CliError::TransportExhausted`] once its retry budget is spent.

use precalc_common::PrecalcError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// A command-line value or batch size is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The lookup service kept failing with transient errors
    #[error("Lookup service unavailable after {attempts} attempt(s): {reason}. The service may be overloaded; try again later or lower --max-per-query.")]
    TransportExhausted { attempts: u32, reason: String },

    /// The lookup service answered with a non-retryable HTTP status
    #[error("Lookup service returned HTTP {status} for '{url}'. Check the lookup URL.")]
    HttpStatus { status: u16, url: String },

    /// The lookup response could not be understood
    #[error("Unexpected lookup response: {0}")]
    ResponseParse(String),

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// The sequence file could not be read
    #[error("Failed to read sequences: {0}")]
    Sequence(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),

    /// File system or stream operation failed
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed outside the retry policy (e.g. client construction)
    #[error("Network request failed: {0}. Check your internet connection and lookup URL.")]
    Http(#[from] reqwest::Error),

    /// JSON encoding failed
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the shared precalc library
    #[error(transparent)]
    Common(#[from] PrecalcError),
}

impl CliError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a response parse error
    pub fn response_parse(msg: impl Into<String>) -> Self {
        Self::ResponseParse(msg.into())
    }

    /// Create a sequence input error
    pub fn sequence(msg: impl Into<String>) -> Self {
        Self::Sequence(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<quick_xml::Error> for CliError {
    fn from(err: quick_xml::Error) -> Self {
        Self::ResponseParse(format!("malformed XML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_names_attempts() {
        let err = CliError::TransportExhausted {
            attempts: 6,
            reason: "HTTP 503".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("6 attempt(s)"));
        assert!(msg.contains("HTTP 503"));
    }

    #[test]
    fn test_common_error_is_transparent() {
        let err: CliError = PrecalcError::InvalidFingerprint("xyz".to_string()).into();
        assert_eq!(err.to_string(), "Invalid fingerprint 'xyz': expected 32 hexadecimal digits");
    }
}

//! Error types shared by the precalc crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, PrecalcError>;

/// Main error type for shared precalc building blocks
#[derive(Error, Debug)]
pub enum PrecalcError {
    #[error("Invalid fingerprint '{0}': expected 32 hexadecimal digits")]
    InvalidFingerprint(String),

    #[error("Unknown sequence format '{0}': expected one of 'fasta', 'raw'")]
    UnknownFormat(String),
}

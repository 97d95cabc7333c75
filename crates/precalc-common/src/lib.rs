//! Precalc Common Library
//!
//! Shared types, utilities, and error handling for the precalculated-match lookup tool.
//!
//! # Overview
//!
//! - **Fingerprints**: case-insensitive MD5 digests used as lookup keys
//! - **Error Handling**: Common error and result types
//! - **Logging**: Centralised `tracing` subscriber setup
//! - **Types**: Input format tags
//!
//! # Example
//!
//! ```
//! use precalc_common::fingerprint::fingerprint;
//!
//! let fp = fingerprint("mkv");
//! assert_eq!(fp, fingerprint("MKV"));
//! assert_eq!(fp.as_str().len(), 32);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PrecalcError, Result};
pub use fingerprint::{fingerprint, Fingerprint};
pub use types::SequenceFormat;

//! Lookup service client
//!
//! HTTP client for the InterPro precalculated match-lookup service.

pub mod client;
pub mod endpoints;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::LookupClient;
pub use transport::{RetryPolicy, Transport};
pub use types::MatchRecord;

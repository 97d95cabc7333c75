//! Runtime configuration for the precalc CLI
//!
//! Lookup URL, HTTP timeout and retry policy. Values come from defaults, then
//! environment variables, then command-line flags.

use crate::api::endpoints::DEFAULT_LOOKUP_URL;
use crate::api::transport::RetryPolicy;
use crate::error::{CliError, Result};
use std::time::Duration;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Default timeout for a single lookup request in seconds.
/// Can be overridden via IPR_PRECALC_TIMEOUT_SECS.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User agent sent with every lookup request
pub const DEFAULT_USER_AGENT: &str = concat!("ipr-precalc/", env!("CARGO_PKG_VERSION"));

/// Environment variable overriding the lookup URL
pub const ENV_LOOKUP_URL: &str = "IPR_PRECALC_URL";
pub const ENV_TIMEOUT_SECS: &str = "IPR_PRECALC_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "IPR_PRECALC_MAX_RETRIES";
pub const ENV_BACKOFF_MS: &str = "IPR_PRECALC_BACKOFF_MS";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Match-lookup endpoint
    pub lookup_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    pub user_agent: String,

    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self {
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Load config from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(url) = std::env::var(ENV_LOOKUP_URL) {
            config.lookup_url = url;
        }

        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            config.timeout_secs = parse_env(ENV_TIMEOUT_SECS, &secs)?;
        }

        if let Ok(retries) = std::env::var(ENV_MAX_RETRIES) {
            config.retry.max_retries = parse_env(ENV_MAX_RETRIES, &retries)?;
        }

        if let Ok(ms) = std::env::var(ENV_BACKOFF_MS) {
            config.retry.backoff_base = Duration::from_millis(parse_env(ENV_BACKOFF_MS, &ms)?);
        }

        Ok(config)
    }

    /// Set the lookup URL
    pub fn with_lookup_url(mut self, url: impl Into<String>) -> Self {
        self.lookup_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reject settings that cannot produce a working client
    pub fn validate(&self) -> Result<()> {
        if self.lookup_url.trim().is_empty() {
            return Err(CliError::config("lookup URL cannot be empty"));
        }

        if !(self.lookup_url.starts_with("http://") || self.lookup_url.starts_with("https://")) {
            return Err(CliError::config(format!(
                "lookup URL '{}' must start with http:// or https://",
                self.lookup_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(CliError::config("timeout must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::config(format!("{} has an invalid value '{}'", name, value)))
}

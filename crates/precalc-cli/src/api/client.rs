//! Lookup client for the precalculated match service
//!
//! One round-trip per batch: send the batch's unique fingerprints, parse the
//! XML answer, and attach each match's sequence by fingerprint.

use crate::api::{endpoints, transport::Transport, types::MatchRecord, xml};
use crate::config::Config;
use crate::dedup::FingerprintMap;
use crate::error::Result;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for the match-lookup endpoint
#[derive(Debug, Clone)]
pub struct LookupClient {
    transport: Transport,
    lookup_url: String,
}

impl LookupClient {
    /// Create a client from runtime configuration
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let transport = Transport::new(
            config.retry.clone(),
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?;

        Ok(Self::with_transport(transport, config.lookup_url.clone()))
    }

    /// Create a client around an existing transport
    pub fn with_transport(transport: Transport, lookup_url: impl Into<String>) -> Self {
        Self {
            transport,
            lookup_url: lookup_url.into(),
        }
    }

    /// Look up one deduplicated batch
    ///
    /// Records come back in the service's order. Fingerprints without a
    /// precalculated match are simply absent.
    #[instrument(skip_all, fields(unique = batch.len()))]
    pub async fn lookup(&self, batch: &FingerprintMap) -> Result<Vec<MatchRecord>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let form = endpoints::lookup_form(batch);
        let body = self.transport.post_form(&self.lookup_url, &form).await?;

        let records = xml::parse_matches(&body)?;
        let records = batch.attach(records)?;

        debug!(
            matched = records.len(),
            unmatched = batch.len().saturating_sub(records.len()),
            "Lookup complete"
        );

        Ok(records)
    }

    /// Get the lookup URL
    pub fn lookup_url(&self) -> &str {
        &self.lookup_url
    }
}

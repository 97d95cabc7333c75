//! Lookup endpoint and request payload helpers

use crate::dedup::FingerprintMap;

/// Public InterPro precalculated match-lookup endpoint
pub const DEFAULT_LOOKUP_URL: &str = "https://www.ebi.ac.uk/interpro/match-lookup/matches/";

/// Form field carrying one fingerprint
pub const FINGERPRINT_PARAM: &str = "md5";

/// Build the form body for one batch: one `md5=<fingerprint>` pair per entry, in batch order
pub fn lookup_form(batch: &FingerprintMap) -> Vec<(&'static str, String)> {
    batch
        .fingerprints()
        .map(|fp| (FINGERPRINT_PARAM, fp.to_string()))
        .collect()
}

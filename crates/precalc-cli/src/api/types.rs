//! Lookup response types

use precalc_common::Fingerprint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the fingerprint field inside a match element
pub const FINGERPRINT_FIELD: &str = "proteinMD5";

/// Key of the domain-hit entries inside a match element
pub const HIT_FIELD: &str = "hit";

/// One precalculated match returned by the lookup service
///
/// Everything besides the fingerprint is kept verbatim in `annotations`, so
/// the record serialises back to the service's own structure plus the
/// attached `sequence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "proteinMD5")]
    pub protein_md5: Fingerprint,

    #[serde(flatten)]
    pub annotations: Map<String, Value>,

    /// Original input sequence, attached after the lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
}

impl MatchRecord {
    /// Fingerprint this record was matched on
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.protein_md5
    }

    /// Domain-hit entries, whether the service sent one or many
    pub fn hits(&self) -> Vec<&Value> {
        match self.annotations.get(HIT_FIELD) {
            Some(Value::Array(hits)) => hits.iter().collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(hit) => vec![hit],
        }
    }
}

//! Per-batch fingerprint deduplication
//!
//! Each batch is keyed by fingerprint before it is sent, so case-insensitive
//! duplicates are requested once. The same map later binds returned matches
//! back to their sequences by fingerprint, never by position: the service
//! leaves out anything it has no precalculated match for.

use crate::api::types::MatchRecord;
use crate::error::{CliError, Result};
use indexmap::IndexMap;
use precalc_common::{fingerprint, Fingerprint};
use tracing::debug;

/// Insertion-ordered fingerprint -> sequence map for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintMap {
    entries: IndexMap<Fingerprint, String>,
}

impl FingerprintMap {
    /// Fingerprint a batch, keeping the first occurrence of each distinct sequence
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = IndexMap::new();
        let mut total = 0usize;

        for sequence in sequences {
            let sequence = sequence.into();
            total += 1;
            entries.entry(fingerprint(&sequence)).or_insert(sequence);
        }

        if total > entries.len() {
            debug!(
                total,
                unique = entries.len(),
                "Collapsed duplicate sequences in batch"
            );
        }

        Self { entries }
    }

    /// Number of distinct fingerprints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprints in first-seen order
    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.entries.keys()
    }

    /// Sequence registered under a fingerprint
    pub fn get(&self, fp: &Fingerprint) -> Option<&str> {
        self.entries.get(fp).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &str)> {
        self.entries.iter().map(|(fp, seq)| (fp, seq.as_str()))
    }

    /// Attach the originating sequence to each returned record
    ///
    /// A record for a fingerprint that was never requested means the response
    /// cannot be trusted, so the whole batch fails.
    pub fn attach(&self, records: Vec<MatchRecord>) -> Result<Vec<MatchRecord>> {
        records
            .into_iter()
            .map(|mut record| {
                let sequence = self.get(record.fingerprint()).ok_or_else(|| {
                    CliError::response_parse(format!(
                        "service returned a match for unrequested fingerprint {}",
                        record.fingerprint()
                    ))
                })?;
                record.sequence = Some(sequence.to_string());
                Ok(record)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn record_for(sequence: &str) -> MatchRecord {
        MatchRecord {
            protein_md5: fingerprint(sequence),
            annotations: Map::new(),
            sequence: None,
        }
    }

    #[test]
    fn test_duplicates_collapse() {
        let map = FingerprintMap::from_sequences(["MKVL", "MKVL"]);
        assert_eq!(map.len(), 1);

        let map = FingerprintMap::from_sequences(["MKVL", "mkvl", "MkVl"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&fingerprint("MKVL")), Some("MKVL"));
    }

    #[test]
    fn test_first_seen_order() {
        let map = FingerprintMap::from_sequences(["CCC", "AAA", "ccc", "BBB", "aaa"]);
        let order: Vec<&Fingerprint> = map.fingerprints().collect();
        assert_eq!(
            order,
            vec![&fingerprint("CCC"), &fingerprint("AAA"), &fingerprint("BBB")]
        );
        let sequences: Vec<&str> = map.iter().map(|(_, seq)| seq).collect();
        assert_eq!(sequences, vec!["CCC", "AAA", "BBB"]);
    }

    #[test]
    fn test_empty_batch() {
        let map = FingerprintMap::from_sequences(Vec::<String>::new());
        assert!(map.is_empty());
        assert_eq!(map.fingerprints().count(), 0);
    }

    #[test]
    fn test_attach_binds_by_fingerprint_not_position() {
        let map = FingerprintMap::from_sequences(["FIRST", "SECOND", "THIRD"]);

        // Server skipped FIRST and answered out of order
        let records = vec![record_for("THIRD"), record_for("SECOND")];
        let attached = map.attach(records).unwrap();

        assert_eq!(attached.len(), 2);
        assert_eq!(attached[0].sequence.as_deref(), Some("THIRD"));
        assert_eq!(attached[1].sequence.as_deref(), Some("SECOND"));
        for record in &attached {
            assert_eq!(
                record.fingerprint(),
                &fingerprint(record.sequence.as_deref().unwrap())
            );
        }
    }

    #[test]
    fn test_attach_rejects_unrequested_fingerprint() {
        let map = FingerprintMap::from_sequences(["MKVL"]);
        let err = map.attach(vec![record_for("OTHER")]).unwrap_err();
        assert!(matches!(err, CliError::ResponseParse(_)));
    }

    #[test]
    fn test_attach_nothing() {
        let map = FingerprintMap::from_sequences(["MKVL"]);
        assert!(map.attach(Vec::new()).unwrap().is_empty());
    }
}

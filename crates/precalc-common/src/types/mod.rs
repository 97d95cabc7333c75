//! Common types used across the precalc crates

use crate::error::PrecalcError;
use serde::{Deserialize, Serialize};

/// Layout of an input sequence file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SequenceFormat {
    /// FASTA records; header lines are discarded and wrapped sequence lines joined
    #[default]
    Fasta,
    /// One bare sequence per line
    Raw,
}

impl SequenceFormat {
    /// All supported formats, in help-text order
    pub const ALL: [SequenceFormat; 2] = [SequenceFormat::Fasta, SequenceFormat::Raw];
}

impl std::str::FromStr for SequenceFormat {
    type Err = PrecalcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fasta" | "fa" => Ok(SequenceFormat::Fasta),
            "raw" | "plain" | "txt" => Ok(SequenceFormat::Raw),
            _ => Err(PrecalcError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for SequenceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceFormat::Fasta => write!(f, "fasta"),
            SequenceFormat::Raw => write!(f, "raw"),
        }
    }
}

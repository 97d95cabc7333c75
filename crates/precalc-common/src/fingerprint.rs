//! Sequence fingerprints
//!
//! A fingerprint is the MD5 digest of the upper-cased sequence, written as 32
//! uppercase hexadecimal digits. This is the key the InterPro match-lookup
//! service indexes its precalculated matches by, so the construction must not
//! drift from it.

use crate::error::{PrecalcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a fingerprint in hex digits
pub const FINGERPRINT_LEN: usize = 32;

/// Uppercase hex MD5 digest of a case-folded sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Borrow the hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Compute the fingerprint of a sequence
///
/// No cleanup is done: a trailing `*` or whitespace is hashed like any other
/// character.
pub fn fingerprint(sequence: &str) -> Fingerprint {
    let digest = md5::compute(sequence.to_uppercase().as_bytes());
    Fingerprint(format!("{:X}", digest))
}

impl FromStr for Fingerprint {
    type Err = PrecalcError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != FINGERPRINT_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PrecalcError::InvalidFingerprint(s.to_string()));
        }
        Ok(Fingerprint(s.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = PrecalcError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

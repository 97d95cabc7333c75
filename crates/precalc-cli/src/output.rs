//! Newline-delimited JSON output

use crate::api::types::MatchRecord;
use crate::error::Result;
use std::io::Write;

/// Writes match records as one compact JSON object per line
pub struct NdjsonWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Write one batch and flush it, so results stream out batch by batch
    ///
    /// An empty batch writes nothing, not even a blank line.
    pub fn write_batch(&mut self, records: &[MatchRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        for record in records {
            serde_json::to_writer(&mut self.inner, record)?;
            self.inner.write_all(b"\n")?;
        }
        self.inner.flush()?;

        self.written += records.len();
        Ok(records.len())
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

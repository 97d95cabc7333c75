//! Lazy sequence input
//!
//! Produces bare sequence strings, one record at a time, from a FASTA or raw
//! file. Residues are passed through exactly as written.

use crate::error::{CliError, Result};
use flate2::read::MultiGzDecoder;
use noodles::fasta;
use precalc_common::SequenceFormat;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Path that selects standard input
pub const STDIN_PATH: &str = "-";

enum Source {
    Fasta(fasta::io::Reader<Box<dyn BufRead>>),
    Raw(io::Lines<Box<dyn BufRead>>),
}

/// Iterator over the sequences of one input
pub struct SequenceReader {
    source: Source,
    records: usize,
    done: bool,
}

impl std::fmt::Debug for SequenceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceReader")
            .field("records", &self.records)
            .field("done", &self.done)
            .finish()
    }
}

/// Open a sequence file; `-` reads stdin and a `.gz` suffix is decompressed
pub fn open(path: &Path, format: SequenceFormat) -> Result<SequenceReader> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == STDIN_PATH {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CliError::FileNotFound(path.display().to_string()),
            _ => CliError::Io(e),
        })?;

        if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    debug!(path = %path.display(), %format, "Opened sequence input");
    Ok(SequenceReader::new(reader, format))
}

impl SequenceReader {
    /// Wrap any buffered reader
    pub fn new(reader: Box<dyn BufRead>, format: SequenceFormat) -> Self {
        let source = match format {
            SequenceFormat::Fasta => Source::Fasta(fasta::io::Reader::new(reader)),
            SequenceFormat::Raw => Source::Raw(reader.lines()),
        };

        Self {
            source,
            records: 0,
            done: false,
        }
    }

    /// Sequences produced so far
    pub fn records_read(&self) -> usize {
        self.records
    }

    fn read_next(&mut self) -> Result<Option<String>> {
        match &mut self.source {
            Source::Fasta(reader) => {
                let mut definition = String::new();
                if reader.read_definition(&mut definition)? == 0 {
                    return Ok(None);
                }

                let mut residues = Vec::new();
                reader.read_sequence(&mut residues)?;

                String::from_utf8(residues).map(Some).map_err(|_| {
                    CliError::sequence(format!(
                        "record '{}' contains non-UTF-8 bytes",
                        definition.trim_start_matches('>')
                    ))
                })
            },
            Source::Raw(lines) => {
                for line in lines.by_ref() {
                    let line = line.map_err(|e| match e.kind() {
                        io::ErrorKind::InvalidData => {
                            CliError::sequence("input contains non-UTF-8 bytes")
                        },
                        _ => CliError::Io(e),
                    })?;
                    let line = line.trim();
                    if !line.is_empty() {
                        return Ok(Some(line.to_string()));
                    }
                }
                Ok(None)
            },
        }
    }
}

impl Iterator for SequenceReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_next() {
            Ok(Some(sequence)) => {
                self.records += 1;
                Some(Ok(sequence))
            },
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

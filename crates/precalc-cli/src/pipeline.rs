//! Lookup pipeline
//!
//! sequence file -> batches -> {dedup -> lookup -> attach} -> NDJSON
//!
//! Batches run one at a time in input order. The first fatal error ends the
//! run; lines already written for earlier batches stay written.

use crate::api::LookupClient;
use crate::batch::Batcher;
use crate::config::Config;
use crate::dedup::FingerprintMap;
use crate::error::Result;
use crate::output::NdjsonWriter;
use crate::sequence;
use crate::Cli;
use precalc_common::SequenceFormat;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, info_span, Instrument};

/// What to read and how to batch it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub format: SequenceFormat,
    pub max_per_query: usize,
}

impl From<&Cli> for PipelineOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            input: cli.seq_file.clone(),
            format: cli.format,
            max_per_query: cli.max_per_query,
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub sequences: usize,
    /// Distinct fingerprints sent, summed over batches
    pub unique: usize,
    pub matched: usize,
}

/// Run the pipeline, streaming records to stdout
pub async fn run(options: &PipelineOptions, config: &Config) -> Result<RunSummary> {
    run_with_writer(options, config, BufWriter::new(io::stdout())).await
}

/// Run the pipeline, streaming records to `out`
pub async fn run_with_writer<W: Write>(
    options: &PipelineOptions,
    config: &Config,
    out: W,
) -> Result<RunSummary> {
    let batcher = Batcher::new(options.max_per_query)?;
    let client = LookupClient::new(config)?;
    let reader = sequence::open(&options.input, options.format)?;

    let mut writer = NdjsonWriter::new(out);
    let mut summary = RunSummary::default();

    for (index, batch) in batcher.try_batches(reader).enumerate() {
        let batch = batch?;
        let sequences = batch.len();
        let unique = FingerprintMap::from_sequences(batch);

        let records = client
            .lookup(&unique)
            .instrument(info_span!("batch", index, sequences))
            .await?;
        writer.write_batch(&records)?;

        summary.batches += 1;
        summary.sequences += sequences;
        summary.unique += unique.len();
        summary.matched += records.len();
    }

    info!(
        batches = summary.batches,
        sequences = summary.sequences,
        unique = summary.unique,
        matched = summary.matched,
        lookup_url = %client.lookup_url(),
        "Lookup finished"
    );

    Ok(summary)
}

//! Precalc CLI Library
//!
//! Looks up precalculated InterPro domain matches for protein sequences.
//!
//! # Overview
//!
//! - **Batching**: split the input into fixed-size lookup batches (`batch`)
//! - **Deduplication**: fingerprint each batch, one entry per distinct sequence (`dedup`)
//! - **Lookup**: query the match-lookup service over a retrying transport (`api`)
//! - **Output**: stream matches as newline-delimited JSON (`output`)
//!
//! Sequences with no precalculated match are absent from the output.

pub mod api;
pub mod batch;
pub mod config;
pub mod dedup;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod sequence;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};
pub use pipeline::{PipelineOptions, RunSummary};

use batch::DEFAULT_MAX_PER_QUERY;
use clap::Parser;
use precalc_common::SequenceFormat;
use std::path::PathBuf;

/// ipr-precalc - look up precalculated InterPro matches for protein sequences
#[derive(Parser, Debug)]
#[command(name = "ipr-precalc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Sequence file ('-' for stdin; '.gz' files are decompressed)
    pub seq_file: PathBuf,

    /// Input format (fasta, raw)
    #[arg(long, value_name = "FORMAT", default_value_t = SequenceFormat::Fasta)]
    pub format: SequenceFormat,

    /// Maximum sequences per lookup request
    #[arg(long = "max-per-query", visible_alias = "max_per_query", value_name = "N", default_value_t = DEFAULT_MAX_PER_QUERY)]
    pub max_per_query: usize,

    /// Match-lookup endpoint
    #[arg(long, env = config::ENV_LOOKUP_URL)]
    pub lookup_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Layer command-line overrides over a base configuration
    pub fn apply_to(&self, config: Config) -> Config {
        match &self.lookup_url {
            Some(url) => config.with_lookup_url(url.clone()),
            None => config,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ipr-precalc", "proteins.fasta"]).unwrap();
        assert_eq!(cli.seq_file, PathBuf::from("proteins.fasta"));
        assert_eq!(cli.format, SequenceFormat::Fasta);
        assert_eq!(cli.max_per_query, 10);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_underscore_alias() {
        let cli = Cli::try_parse_from([
            "ipr-precalc",
            "proteins.txt",
            "--format",
            "raw",
            "--max_per_query",
            "25",
        ])
        .unwrap();
        assert_eq!(cli.format, SequenceFormat::Raw);
        assert_eq!(cli.max_per_query, 25);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["ipr-precalc", "x.fa", "--format", "genbank"]).is_err());
        assert!(Cli::try_parse_from(["ipr-precalc", "x.fa", "--max-per-query", "-1"]).is_err());
        assert!(Cli::try_parse_from(["ipr-precalc"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "ipr-precalc",
            "x.fa",
            "--lookup-url",
            "http://localhost:1234/matches/",
        ])
        .unwrap();
        let config = cli.apply_to(Config::new());
        assert_eq!(config.lookup_url, "http://localhost:1234/matches/");

        let options = PipelineOptions::from(&cli);
        assert_eq!(options.input, PathBuf::from("x.fa"));
        assert_eq!(options.max_per_query, 10);
    }
}

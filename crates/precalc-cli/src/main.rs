//! ipr-precalc - Main entry point

use clap::Parser;
use precalc_cli::{pipeline, Cli, Config, PipelineOptions};
use precalc_common::logging::{init_logging, LogConfig};
use std::process;
use tracing::error;
use tracing::level_filters::LevelFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Pick up IPR_PRECALC_* / LOG_* from a local .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Results go to stdout, so logging stays quiet on stderr unless asked
    let base = LogConfig::builder()
        .level(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN })
        .build();
    let log_config = match base.clone().apply_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring LOG_* settings: {:#}", e);
            base
        },
    };

    // The tool works without logging
    let log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        },
    };

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Lookup failed");
        eprintln!("Error: {}", e);
        drop(log_guard);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> precalc_cli::Result<()> {
    let config = cli.apply_to(Config::from_env()?);
    let options = PipelineOptions::from(cli);

    pipeline::run(&options, &config).await?;
    Ok(())
}

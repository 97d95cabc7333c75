//! Logging setup
//!
//! One `tracing` subscriber for the whole process. Diagnostics never touch
//! stdout, which carries result records; they go to stderr, to a daily log
//! file, or to both.
//!
//! Use the structured macros with fields rather than formatting values into
//! the message:
//!
//! ```rust,ignore
//! use tracing::warn;
//!
//! warn!(attempt, status = %status, "Transient lookup failure, retrying");
//! ```
//!
//! # Example
//!
//! ```no_run
//! use precalc_common::logging::{init_logging, LogConfig};
//! use tracing::level_filters::LevelFilter;
//!
//! let config = LogConfig::builder().level(LevelFilter::DEBUG).build();
//! let _guard = init_logging(&config.apply_env().unwrap()).unwrap();
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    #[default]
    Stderr,
    File,
    Both,
}

impl LogDestination {
    fn stderr(self) -> bool {
        matches!(self, Self::Stderr | Self::Both)
    }

    fn file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

impl std::str::FromStr for LogDestination {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stderr" | "console" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            "both" => Ok(Self::Both),
            other => anyhow::bail!("Invalid log output '{}': expected stderr, file or both", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Invalid log format '{}': expected text or json", other),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Most verbose level emitted
    pub level: LevelFilter,
    pub output: LogDestination,
    pub format: LogFormat,

    /// Directory for daily log files
    pub log_dir: PathBuf,

    /// File name prefix; files are named `<prefix>.<date>`
    pub log_file_prefix: String,

    /// Extra `EnvFilter` directives, comma separated (e.g. "hyper=warn")
    pub filter_directives: Option<String>,

    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
            output: LogDestination::Stderr,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "ipr-precalc".to_string(),
            filter_directives: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Override fields from `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`,
    /// `LOG_FILE_PREFIX`, `LOG_FILTER` and `LOG_INCLUDE_LOCATION`
    pub fn apply_env(mut self) -> Result<Self> {
        if let Some(level) = env_value("LOG_LEVEL") {
            self.level = level
                .parse()
                .with_context(|| format!("Invalid LOG_LEVEL '{}'", level))?;
        }
        if let Some(output) = env_value("LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Some(format) = env_value("LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(dir) = env_value("LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = env_value("LOG_FILE_PREFIX") {
            self.log_file_prefix = prefix;
        }
        if let Some(filter) = env_value("LOG_FILTER") {
            self.filter_directives = Some(filter);
        }
        if let Some(flag) = env_value("LOG_INCLUDE_LOCATION") {
            self.include_location = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(self)
    }

    fn filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::builder()
            .with_default_directive(self.level.into())
            .from_env_lossy();

        for directive in self
            .filter_directives
            .iter()
            .flat_map(|d| d.split(','))
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            filter = filter.add_directive(
                directive
                    .parse()
                    .with_context(|| format!("Invalid log filter directive '{}'", directive))?,
            );
        }

        Ok(filter)
    }

    fn layer<W>(&self, writer: W, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(FmtSpan::CLOSE);

        match self.format {
            LogFormat::Text => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogDestination) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn include_location(mut self, include: bool) -> Self {
        self.config.include_location = include;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Install the global subscriber
///
/// Call once at startup. When file output is enabled the returned guard must
/// be held until exit; dropping it flushes buffered lines.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let mut layers = Vec::new();
    let mut guard = None;

    if config.output.stderr() {
        layers.push(config.layer(std::io::stderr, true));
    }

    if config.output.file() {
        std::fs::create_dir_all(&config.log_dir).with_context(|| {
            format!("Failed to create log directory {}", config.log_dir.display())
        })?;

        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(config.layer(writer, false));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(config.filter()?)
        .try_init()
        .context("Logging already initialised")?;

    Ok(guard)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_from_str() {
        assert_eq!("stderr".parse::<LogDestination>().unwrap(), LogDestination::Stderr);
        assert_eq!("Console".parse::<LogDestination>().unwrap(), LogDestination::Stderr);
        assert_eq!("FILE".parse::<LogDestination>().unwrap(), LogDestination::File);
        assert_eq!("both".parse::<LogDestination>().unwrap(), LogDestination::Both);
        assert!("stdout".parse::<LogDestination>().is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_default_is_quiet_stderr() {
        let config = LogConfig::default();
        assert_eq!(config.level, LevelFilter::WARN);
        assert!(config.output.stderr());
        assert!(!config.output.file());
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::builder()
            .level(LevelFilter::DEBUG)
            .output(LogDestination::Both)
            .format(LogFormat::Json)
            .log_dir("/var/log/ipr-precalc")
            .log_file_prefix("lookup")
            .filter_directives("hyper=warn,reqwest=info")
            .include_location(true)
            .build();

        assert_eq!(config.level, LevelFilter::DEBUG);
        assert!(config.output.stderr() && config.output.file());
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/ipr-precalc"));
        assert_eq!(config.log_file_prefix, "lookup");
        assert!(config.include_location);
        assert!(config.filter().is_ok());
    }

    #[test]
    fn test_bad_filter_directive_rejected() {
        let config = LogConfig::builder().filter_directives("reqwest=loud").build();
        assert!(config.filter().is_err());
    }
}

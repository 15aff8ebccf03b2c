//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! All library crates log through `tracing`; this module installs the
//! subscriber for the command-line tool.
//!
//! # Log Levels
//!
//! - `error`: run failures
//! - `warn`: unavailable forms, duplicate exports, re-encoded documents
//! - `info`: export start and completion with row counts
//! - `debug`: page fetches and filter details
//! - `trace`: field filter values (redacted unless `--log-data` is set)
//!
//! # Usage
//!
//! ```ignore
//! use mfx_cli::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::default();
//! init_logging(&config)?;
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when entry values must not be logged.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Returns true if logging of submitted values is explicitly enabled.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the input value when data logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Maximum level emitted by the workspace crates.
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace `level_filter` when set.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
    /// Whether submitted entry values may be logged.
    pub log_data: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field human-readable lines.
    #[default]
    Pretty,
    /// Single-line events.
    Compact,
    /// One JSON object per event, plus span close events with timings.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

/// Install the global subscriber for `config`.
///
/// # Errors
///
/// Fails when the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(output_layer(config, writer))
        .try_init()
        .map_err(io::Error::other)
}

/// Formatting layer for `config.format`; log files never get ANSI colors.
fn output_layer<S>(config: &LogConfig, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    let ansi = config.with_ansi && config.log_file.is_none();
    match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .without_time()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .without_time()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .boxed(),
    }
}

/// Directive string for the workspace crates at `level`; others stay at warn.
fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    format!(
        "warn,multiform_export={level},mfx_cli={level},mfx_export={level},\
         mfx_map={level},mfx_model={level}"
    )
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let fallback = || EnvFilter::new(default_directives(config.level_filter));
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_workspace_crates() {
        let directives = default_directives(LevelFilter::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("mfx_export=debug"));
        assert!(directives.contains("mfx_map=debug"));
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LogConfig {
            log_file: Some(dir.path().join("missing").join("export.log")),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_err());
        assert!(!log_data_enabled());
    }

    #[test]
    fn env_filter_is_ignored_when_a_level_is_forced() {
        let config = LogConfig {
            level_filter: LevelFilter::TRACE,
            use_env_filter: false,
            ..LogConfig::default()
        };
        assert_eq!(
            build_env_filter(&config).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn values_are_redacted_by_default() {
        assert!(!log_data_enabled());
        assert_eq!(redact_value("alice@example.com"), REDACTED_VALUE);
    }
}

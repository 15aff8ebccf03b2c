//! CLI argument definitions for the multi-form exporter.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use mfx_export::{FieldFilter, FilterOperator};

#[derive(Parser)]
#[command(
    name = "multiform-export",
    version,
    about = "Export entries of several forms into one CSV document",
    long_about = "Export entries of several forms into one CSV document.\n\n\
                  Each output column maps to a different field on every participating\n\
                  form; cells stay empty where a column has no field on an entry's form."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow submitted entry values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the registered exports.
    List(SourceArgs),

    /// Generate the document for one export.
    Export(ExportArgs),
}

#[derive(Args)]
pub struct SourceArgs {
    /// Export configuration (JSON).
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// Host data with forms, entries and long values (JSON).
    #[arg(long = "data", value_name = "PATH")]
    pub data: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Name of the registered export.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// First local day to include (YYYY-MM-DD).
    #[arg(long = "start", value_name = "DATE", value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last local day to include (YYYY-MM-DD).
    #[arg(long = "end", value_name = "DATE", value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Entry value filter: KEY=VALUE, KEY!=VALUE or KEY~=VALUE (contains).
    #[arg(long = "filter", value_name = "FILTER", value_parser = parse_filter)]
    pub filters: Vec<FieldFilter>,

    /// Directory for the generated file (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR", conflicts_with = "stdout")]
    pub output_dir: Option<PathBuf>,

    /// Write the document to stdout instead of a file.
    #[arg(long = "stdout")]
    pub stdout: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_filter(raw: &str) -> Result<FieldFilter, String> {
    let (key, operator, value) = if let Some((key, value)) = raw.split_once("!=") {
        (key, FilterOperator::IsNot, value)
    } else if let Some((key, value)) = raw.split_once("~=") {
        (key, FilterOperator::Contains, value)
    } else if let Some((key, value)) = raw.split_once('=') {
        (key, FilterOperator::Is, value)
    } else {
        return Err("expected KEY=VALUE, KEY!=VALUE or KEY~=VALUE".to_string());
    };
    let key = key.trim();
    if key.is_empty() {
        return Err("filter key is empty".to_string());
    }
    Ok(FieldFilter {
        key: key.to_string(),
        operator,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filters_parse_operators() {
        assert_eq!(parse_filter("2=a@x.com").unwrap(), FieldFilter::is("2", "a@x.com"));
        let not = parse_filter("3!=no").unwrap();
        assert_eq!(not.operator, FilterOperator::IsNot);
        assert_eq!(not.value, "no");
        let contains = parse_filter("1~=Al").unwrap();
        assert_eq!(contains.operator, FilterOperator::Contains);
        assert_eq!(contains.key, "1");
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn export_args_parse() {
        let cli = Cli::try_parse_from([
            "multiform-export",
            "export",
            "Contacts",
            "--config",
            "c.json",
            "--data",
            "d.json",
            "--start",
            "2024-01-01",
            "--filter",
            "1=Alice",
            "--stdout",
        ])
        .unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.name, "Contacts");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.end, None);
        assert_eq!(args.filters, vec![FieldFilter::is("1", "Alice")]);
        assert!(args.stdout);
    }
}

//! CLI argument definitions for the IVR field mapper.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ivr-mapper",
    version,
    about = "Resolve and validate IVR form field mappings",
    long_about = "Map internal order fields onto the fields an IVR form template exposes.\n\n\
                  Stored mappings are checked against the current template and corrected\n\
                  or removed; OCR labels can flag mappings that disagree with the document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve source fields against a target catalog and print the report.
    Resolve(ResolveArgs),

    /// List alias corpus entries.
    Aliases(AliasesArgs),
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// JSON object of source field keys to values.
    #[arg(long = "sources", value_name = "JSON")]
    pub sources: PathBuf,

    /// JSON target field catalog from the template service.
    #[arg(long = "catalog", value_name = "JSON")]
    pub catalog: PathBuf,

    /// Manufacturer or template scope for alias lookups.
    #[arg(long = "scope", value_name = "ID")]
    pub scope: Option<String>,

    /// Previously accepted mappings to validate.
    #[arg(long = "stored", value_name = "JSON")]
    pub stored: Option<PathBuf>,

    /// OCR labels extracted from the rendered document.
    #[arg(long = "ocr", value_name = "JSON")]
    pub ocr: Option<PathBuf>,

    /// Alias corpus directory (default: built-in global table).
    #[arg(long = "aliases", value_name = "DIR")]
    pub aliases: Option<PathBuf>,

    /// Match policy JSON (default thresholds when omitted).
    #[arg(long = "policy", value_name = "JSON")]
    pub policy: Option<PathBuf>,

    /// Report output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormatArg,
}

#[derive(Parser)]
pub struct AliasesArgs {
    /// Alias corpus directory (default: built-in global table).
    #[arg(long = "aliases", value_name = "DIR")]
    pub aliases: Option<PathBuf>,

    /// Only show entries visible from this scope.
    #[arg(long = "scope", value_name = "ID")]
    pub scope: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Table,
    Json,
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

//! IVR field mapper CLI.

use clap::{ColorChoice, Parser};
use ivr_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, ReportFormatArg};
use crate::commands::{run_aliases, run_resolve};
use crate::summary::{print_aliases, print_report};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Resolve(args) => match run_resolve(&args) {
            Ok(report) => {
                let printed = match args.format {
                    ReportFormatArg::Table => {
                        print_report(&report);
                        Ok(())
                    }
                    ReportFormatArg::Json => serde_json::to_string_pretty(&report)
                        .map(|json| println!("{json}")),
                };
                match printed {
                    Ok(()) if report.needs_attention() => 1,
                    Ok(()) => 0,
                    Err(error) => {
                        eprintln!("error: failed to serialize report: {error}");
                        1
                    }
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                2
            }
        },
        Command::Aliases(args) => match run_aliases(&args) {
            Ok(entries) => {
                print_aliases(&entries);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                2
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

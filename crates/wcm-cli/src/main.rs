//! Word column mapper CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use wcm_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use wcm_cli::config::{AppConfig, load_config};
use wcm_cli::logging::{LogConfig, LogFormat, init_logging};
use wcm_model::SetOperation;

mod commands;
mod summary;

use crate::commands::{
    open_service, run_rank, run_reverse, run_search, run_set_operation, run_stats, run_traverse,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!(error = %error, "command failed");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let config = config_from_cli(cli)?;
    let service = open_service(&config, &cli.sources)?;
    match &cli.command {
        Command::Search(args) => run_search(&service, args, cli.json),
        Command::Reverse(args) => run_reverse(&service, args, cli.json),
        Command::Intersect(args) => {
            run_set_operation(&service, args, SetOperation::Intersection, cli.json)
        }
        Command::Union(args) => run_set_operation(&service, args, SetOperation::Union, cli.json),
        Command::Rank(args) => run_rank(&service, args, cli.json),
        Command::Traverse(args) => run_traverse(&service, args, &config, cli.json),
        Command::Stats => run_stats(&service, cli.json),
    }
}

/// Config file values with command-line overrides applied.
fn config_from_cli(cli: &Cli) -> Result<AppConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(min_confidence) = cli.min_confidence {
        anyhow::ensure!(
            (0.0..=1.0).contains(&min_confidence),
            "--min-confidence must be between 0 and 1, got {min_confidence}"
        );
        config.search = config.search.with_min_confidence(min_confidence);
    }
    Ok(config)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::default()
        .with_level_filter(cli.verbosity.tracing_level_filter())
        .with_log_file(cli.log_file.clone());
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
    config = config.with_format(match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    });
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

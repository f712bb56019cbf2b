//! Contract Studio CLI.

use clap::{ColorChoice, Parser};
use scs_cli::config::AppConfig;
use scs_cli::logging::{LogConfig, LogFormat, init_logging};
use scs_persistence::PersistenceError;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputFormatArg};
use crate::commands::{
    SavedOutcome, run_builds, run_compile, run_draft, run_hash, run_saved, run_snippets,
};
use crate::summary::{
    print_builds_table, print_compile_report, print_saved_table, print_snippets_table,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let exit_code = match run(&cli.command, &config).await {
        Ok(code) => code,
        Err(error) => {
            report_error(&error);
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(command: &Command, config: &AppConfig) -> anyhow::Result<i32> {
    match command {
        Command::Compile(args) => {
            let report = run_compile(args, config).await?;
            match args.format {
                OutputFormatArg::Table => print_compile_report(&report),
                OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            Ok(if report.has_errors() { 1 } else { 0 })
        }
        Command::Hash { bytecode } => match run_hash(bytecode) {
            Some(hash) => {
                println!("{hash}");
                Ok(0)
            }
            None => {
                eprintln!("no metadata hash found");
                Ok(1)
            }
        },
        Command::Builds(args) => {
            print_builds_table(&run_builds(args)?);
            Ok(0)
        }
        Command::Saved(command) => {
            match run_saved(command, config).await? {
                SavedOutcome::Listed(entries) => print_saved_table(&entries),
                SavedOutcome::Saved(entry) => {
                    println!("Saved {} as {}", entry.contract.name, entry.id);
                }
                SavedOutcome::Loaded {
                    written_to: Some(path),
                    ..
                } => println!("Wrote {path}"),
                SavedOutcome::Loaded { source, .. } => print!("{source}"),
                SavedOutcome::Deleted { id, name } => println!("Deleted {name} ({id})"),
            }
            Ok(0)
        }
        Command::Snippets => {
            print_snippets_table(&run_snippets());
            Ok(0)
        }
        Command::Draft(command) => {
            if let Some(draft) = run_draft(command, config).await? {
                print!("{draft}");
            }
            Ok(0)
        }
    }
}

fn report_error(error: &anyhow::Error) {
    eprintln!("error: {error:#}");
    if let Some(suggestion) = error
        .downcast_ref::<PersistenceError>()
        .and_then(PersistenceError::suggestion)
    {
        eprintln!("hint: {suggestion}");
    }
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

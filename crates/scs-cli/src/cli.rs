//! CLI argument definitions for `contract-studio`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use scs_compiler::DEFAULT_BUILD_BASE_URL;

#[derive(Parser)]
#[command(
    name = "contract-studio",
    version,
    about = "Contract Studio - compile and manage Solidity contracts",
    long_about = "Compile Solidity contracts with a local solc, inspect compiler builds \
                  and manage a library of saved contracts.\n\n\
                  Diagnostics are mapped onto source lines and columns; the exit code \
                  is 1 when compilation reports errors or the compiler fails."
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

    /// Configuration file (default: the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

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
    /// Compile a contract and report contracts and diagnostics.
    Compile(CompileArgs),

    /// Print the metadata hash embedded in contract bytecode.
    Hash {
        /// Runtime or deployment bytecode, with or without 0x.
        #[arg(value_name = "BYTECODE")]
        bytecode: String,
    },

    /// List the builds of a solc `list.json` document.
    Builds(BuildsArgs),

    /// Manage saved contracts.
    #[command(subcommand)]
    Saved(SavedCommand),

    /// List the built-in example contracts.
    Snippets,

    /// Manage the unsaved draft.
    #[command(subcommand)]
    Draft(DraftCommand),
}

#[derive(Parser)]
pub struct CompileArgs {
    /// Solidity source file (default: the stored draft).
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Compiler version to use, short or long form.
    #[arg(long = "build", value_name = "VERSION")]
    pub build: Option<String>,

    /// solc `list.json` to choose builds from (default: the local solc).
    #[arg(long = "builds", value_name = "LIST")]
    pub builds: Option<PathBuf>,

    /// Base URL prefixed to build paths from the list.
    #[arg(long = "base-url", value_name = "URL", default_value = DEFAULT_BUILD_BASE_URL)]
    pub base_url: String,

    /// Run the optimizer.
    #[arg(long = "optimize")]
    pub optimize: bool,

    /// Contract to select after compiling.
    #[arg(long = "contract", value_name = "NAME")]
    pub contract: Option<String>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Parser)]
pub struct BuildsArgs {
    /// Path to a solc `list.json` document.
    #[arg(value_name = "LIST")]
    pub list: PathBuf,

    /// Only show tagged releases.
    #[arg(long = "releases")]
    pub releases_only: bool,

    /// Base URL prefixed to build paths.
    #[arg(long = "base-url", value_name = "URL", default_value = DEFAULT_BUILD_BASE_URL)]
    pub base_url: String,
}

#[derive(Subcommand)]
pub enum SavedCommand {
    /// List saved contracts, newest first.
    List,

    /// Save a source file under a name.
    Save {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print a saved contract's source, or write it to a file.
    Load {
        #[arg(value_name = "ID")]
        id: String,
        /// Write to this file instead of stdout.
        #[arg(long = "output", short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Delete a saved contract.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum DraftCommand {
    /// Print the draft.
    Show,

    /// Replace the draft with a file's contents.
    Set {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete the draft.
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
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

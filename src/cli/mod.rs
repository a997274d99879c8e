//! Command line interface for evalcache.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::LogBackend;

/// evalcache - inspect objective call logs.
#[derive(Parser, Debug)]
#[command(name = "evalcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "evalcache.toml")]
    pub config: PathBuf,

    /// Verbose mode.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration file.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Prints the records of a call log.
    Show {
        /// Call log to read.
        log: PathBuf,

        /// Only the last N records.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Storage backend (default: from the file extension).
        #[arg(short, long)]
        backend: Option<LogBackend>,
    },

    /// Summarizes a call log.
    Summary {
        /// Call log to read.
        log: PathBuf,

        /// Storage backend (default: from the file extension).
        #[arg(short, long)]
        backend: Option<LogBackend>,
    },

    /// Truncates a call log to empty.
    Clear {
        /// Call log to truncate.
        log: PathBuf,

        /// Storage backend (default: from the file extension).
        #[arg(short, long)]
        backend: Option<LogBackend>,
    },

    /// Shows version.
    Version,
}

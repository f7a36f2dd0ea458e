//! CLI argument definitions for Maintboard.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Version string with build information, shown by `mb --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("MB_GIT_COMMIT"),
    "\nbuilt: ",
    env!("MB_BUILD_TIMESTAMP"),
);

/// Maintboard - dashboard views over a maintenance records spreadsheet.
///
/// Start with `mb summary` for the headline numbers, then `mb records` to list items.
#[derive(Parser, Debug)]
#[command(name = "mb")]
#[command(author, version, long_version = LONG_VERSION, about = "A dashboard for maintenance records kept in spreadsheets", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Spreadsheet to load (.xlsx, .xls, .ods or .csv).
    /// Can also be set via MB_SOURCE environment variable.
    #[arg(short = 's', long = "source", global = true)]
    pub source: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the summary cards (start here!)
    Summary {
        /// Named filter applied before computing the cards
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// List records matching a filter
    Records {
        /// Named filter (all, not-started, high-priority, critical, complete, overdue, urgent)
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Show at most this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List the most recently added records
    Recent {
        /// Named filter applied before ordering
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Number of rows (defaults to the configured recent-limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List every record with exactly this Status
    Drilldown {
        /// Status value, matched exactly (e.g. "In Progress")
        status: String,
    },

    /// Show status, priority and deck level distributions, and risk by priority
    Breakdown {
        /// Named filter applied before counting
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Validate a new record and echo it back (nothing is saved)
    Add {
        #[arg(long)]
        asset_tag: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Write the built-in sample records to a CSV file
    Sample {
        /// Output path (must end in .csv)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Keep refreshing and print the summary after each refresh
    #[cfg(feature = "watch")]
    Watch {
        /// Seconds between refreshes (defaults to the configured refresh-interval)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Named filter for the printed summary
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Do not refresh when the source file changes
        #[arg(long)]
        no_file_watch: bool,

        /// Do not read manual refresh requests from stdin
        #[arg(long)]
        no_stdin: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,
}

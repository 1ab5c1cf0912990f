//! Command-line surface.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dirsentry", version, about = "Watch a directory tree and analyse its disk usage")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON config file; unset fields keep their defaults.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch PATH recursively and print every file event.
    Watch {
        path: PathBuf,
        /// Stop after this many seconds and print the audit log.
        #[arg(long)]
        seconds: Option<u64>,
        /// Print events as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Aggregate size, counts and extension breakdown for PATH.
    Insight {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List the largest files under PATH.
    Top {
        path: PathBuf,
        #[arg(long)]
        json: bool,
        /// Also write the list as CSV.
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// List temp/log/backup/cache files under PATH.
    Cleanup {
        path: PathBuf,
        /// Delete every listed candidate.
        #[arg(long)]
        delete: bool,
        #[arg(long)]
        json: bool,
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
}

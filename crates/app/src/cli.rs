//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Collapse duplicates, then reconcile on the cron schedule until signalled
    Run,
    /// Run a single reconciliation pass and exit
    Once,
    /// Delete duplicate managed events and exit
    Collapse {
        /// Days to scan, starting today (defaults to `reconcile.collapse_days`)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Print the creates and deletes the next pass would issue, without applying them
    Plan,
}

impl Command {
    /// Whether the command creates or deletes calendar events.
    pub fn mutates_calendar(self) -> bool {
        !matches!(self, Command::Plan)
    }
}

#[derive(Debug, Parser)]
#[command(name = "busysync", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML or JSON); standard locations are probed when omitted
    #[arg(long, global = true, env = "BUSYSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the single-instance PID file
    #[arg(long, global = true, env = "BUSYSYNC_LOCK_DIR")]
    pub lock_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// The requested command; `run` when none is given.
    pub fn selected(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    pub fn lock_dir(&self) -> PathBuf {
        self.lock_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

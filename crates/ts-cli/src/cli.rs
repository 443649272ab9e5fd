//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::clock::{ClockInArgs, ClockOutArgs};
use crate::commands::totals::TotalsArgs;

/// Task and project timesheet.
///
/// Clock in to a task, clock out when done, and see how much time went into
/// each task and project this week and overall.
#[derive(Debug, Parser)]
#[command(name = "ts", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clock in to a task.
    In(ClockInArgs),

    /// Clock out of the running task.
    Out(ClockOutArgs),

    /// Show the running task.
    Status,

    /// List every task and project recorded so far.
    Names,

    /// Show week and total time for the most recent task and project,
    /// or for one named task or project.
    Totals(TotalsArgs),

    /// List every entry.
    History {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

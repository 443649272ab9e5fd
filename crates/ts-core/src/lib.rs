//! Core domain logic for the timesheet.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: validated task/project records with an active or closed status
//! - Accounting: total and current-week time over a set of entries
//! - Views: the running task, the most recent task/project and their totals,
//!   read through any [`Ledger`]

pub mod accounting;
mod entry;
mod ledger;
mod types;
pub mod views;

pub use accounting::{ItemTotals, total_time, total_time_at, week_start, week_time, week_time_at};
pub use entry::{Entry, EntryStatus};
pub use ledger::{EmptyLedger, Ledger};
pub use types::{EntryId, ItemField, ProjectName, TaskName, ValidationError};
pub use views::{
    CurrentTask, TotalsSummary, current_task_display, item_totals, most_recent_summary,
    totals_summary,
};

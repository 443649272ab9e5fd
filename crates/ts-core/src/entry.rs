//! Timesheet entries: one row of tracked time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EntryId, ItemField, ProjectName, TaskName};

/// Whether an entry is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryStatus {
    /// Clocked in, not yet clocked out.
    Active,
    /// Clocked out at `time_out`.
    Closed { time_out: DateTime<Utc> },
}

/// A tracked span of time against a task and project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Ledger-assigned identifier, monotonic on insert.
    pub id: EntryId,
    pub task: TaskName,
    pub project: ProjectName,
    /// Free-form notes. Replaced once, at clock-out.
    #[serde(default)]
    pub notes: String,
    /// When the entry was clocked in.
    pub time_in: DateTime<Utc>,
    pub status: EntryStatus,
}

impl Entry {
    /// Returns true if the entry has not been clocked out.
    pub const fn is_active(&self) -> bool {
        matches!(self.status, EntryStatus::Active)
    }

    /// Returns the clock-out time, if the entry is closed.
    pub const fn time_out(&self) -> Option<DateTime<Utc>> {
        match self.status {
            EntryStatus::Active => None,
            EntryStatus::Closed { time_out } => Some(time_out),
        }
    }

    /// The clock-out time if closed, otherwise `now`.
    pub fn effective_time_out(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.time_out().unwrap_or(now)
    }

    /// Returns the value of the given field.
    pub fn field(&self, field: ItemField) -> &str {
        match field {
            ItemField::Task => self.task.as_str(),
            ItemField::Project => self.project.as_str(),
        }
    }
}

//! Clock ledger storage for the timesheet.
//!
//! Provides persistence for timesheet entries using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` is meant to be owned by the single control flow that drives it;
//! callers that need to share one must wrap it in a `Mutex`.
//!
//! # Schema
//!
//! A single `timesheet` table holds one row per entry. Every mutation runs in
//! its own transaction, so a crash never leaves a half-written row.
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2026-10-12T09:30:00.000Z`), always UTC.
//!
//! An entry that has not been clocked out stores [`ACTIVE_SENTINEL`] in
//! `time_out`. The sentinel never leaves this crate: rows are decoded into
//! [`EntryStatus::Active`] or [`EntryStatus::Closed`].
//!
//! ## Legacy Rows
//!
//! Databases written by the desktop version of the timesheet store naive
//! local times (`2021-05-03 10:00:00.123456`) and use `0001-01-01 00:00:00` as the
//! sentinel. Both are still read, and legacy active rows can be clocked out.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use thiserror::Error;
use ts_core::{
    EmptyLedger, Entry, EntryId, EntryStatus, ItemField, Ledger, ProjectName, TaskName,
    ValidationError,
};

/// Stored `time_out` of an entry that is still running.
pub const ACTIVE_SENTINEL: &str = "0001-01-01T00:00:00.000Z";

/// Sentinel written by the desktop version.
const LEGACY_ACTIVE_SENTINEL: &str = "0001-01-01 00:00:00";

/// Naive local timestamp format written by the desktop version.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const ENTRY_COLUMNS: &str = "id, task, project, notes, time_in, time_out";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Task or project was blank.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Clock-out was requested while nothing is clocked in.
    #[error("no active entry to clock out")]
    NoActiveEntry,
    /// A query that needs history ran against an empty ledger.
    #[error(transparent)]
    EmptyLedger(#[from] EmptyLedger),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for entry {entry_id}: {timestamp}")]
    TimestampParse {
        entry_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates the entry rules.
    #[error("invalid entry data for {entry_id}: {message}")]
    InvalidEntryData { entry_id: i64, message: String },
}

/// More than one entry was active when clocking out; all of them were closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("closed {} active entries at once: {}", .ids.len(), join_ids(.ids))]
pub struct MultipleActiveEntries {
    pub ids: Vec<EntryId>,
}

fn join_ids(ids: &[EntryId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a clock-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOut {
    /// The newest closed entry.
    pub id: EntryId,
    /// Older entries that were also still active and got closed.
    pub also_closed: Vec<EntryId>,
    /// Clock-out time written to every closed entry.
    pub time_out: DateTime<Utc>,
}

impl ClockOut {
    /// Returns a warning if the single-active-entry invariant had been broken.
    pub fn warning(&self) -> Option<MultipleActiveEntries> {
        if self.also_closed.is_empty() {
            return None;
        }
        let mut ids = self.also_closed.clone();
        ids.push(self.id);
        Some(MultipleActiveEntries { ids })
    }
}

/// Distinct task and project names, sorted ascending by code point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemNames {
    pub tasks: BTreeSet<String>,
    pub projects: BTreeSet<String>,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An entry row as stored, before validation.
struct EntryRow {
    id: i64,
    task: Option<String>,
    project: Option<String>,
    notes: Option<String>,
    time_in: Option<String>,
    time_out: Option<String>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task: row.get(1)?,
            project: row.get(2)?,
            notes: row.get(3)?,
            time_in: row.get(4)?,
            time_out: row.get(5)?,
        })
    }

    fn into_entry(self) -> Result<Entry, DbError> {
        let entry_id = self.id;
        let invalid = |message: String| DbError::InvalidEntryData { entry_id, message };

        let task = TaskName::new(self.task.unwrap_or_default()).map_err(|e| invalid(e.to_string()))?;
        let project =
            ProjectName::new(self.project.unwrap_or_default()).map_err(|e| invalid(e.to_string()))?;
        let time_in = self
            .time_in
            .ok_or_else(|| invalid("missing time_in".to_string()))?;
        let time_out = self
            .time_out
            .ok_or_else(|| invalid("missing time_out".to_string()))?;

        if is_active_sentinel(&time_in) {
            return Err(invalid("time_in is the active sentinel".to_string()));
        }
        let status = if is_active_sentinel(&time_out) {
            EntryStatus::Active
        } else {
            EntryStatus::Closed {
                time_out: parse_timestamp(&time_out, entry_id)?,
            }
        };

        Ok(Entry {
            id: EntryId::new(entry_id),
            task,
            project,
            notes: self.notes.unwrap_or_default(),
            time_in: parse_timestamp(&time_in, entry_id)?,
            status,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened timesheet database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- time_in/time_out: RFC 3339 TEXT (e.g., '2026-10-12T09:30:00.000Z')
            -- time_out holds the active sentinel until the entry is clocked out
            CREATE TABLE IF NOT EXISTS timesheet (
                id INTEGER PRIMARY KEY,
                task TEXT,
                project TEXT,
                notes TEXT,
                time_in TIMESTAMP,
                time_out TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_timesheet_time_out ON timesheet(time_out);
            CREATE INDEX IF NOT EXISTS idx_timesheet_task ON timesheet(task);
            CREATE INDEX IF NOT EXISTS idx_timesheet_project ON timesheet(project);
            ",
        )?;
        Ok(())
    }

    /// Clocks in: records a new active entry starting now.
    ///
    /// The caller must make sure nothing is active already; this is not
    /// re-checked here.
    pub fn add_entry(&mut self, task: &str, project: &str, notes: &str) -> Result<EntryId, DbError> {
        self.add_entry_at(task, project, notes, Utc::now())
    }

    /// Clocks in with an explicit clock-in time.
    pub fn add_entry_at(
        &mut self,
        task: &str,
        project: &str,
        notes: &str,
        time_in: DateTime<Utc>,
    ) -> Result<EntryId, DbError> {
        let task = TaskName::new(task)?;
        let project = ProjectName::new(project)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO timesheet (task, project, notes, time_in, time_out)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                task.as_str(),
                project.as_str(),
                notes,
                format_timestamp(time_in),
                ACTIVE_SENTINEL,
            ],
        )?;
        let id = EntryId::new(tx.last_insert_rowid());
        tx.commit()?;

        tracing::debug!(%id, %task, %project, "clocked in");
        Ok(id)
    }

    /// Clocks out: closes the active entry now and replaces its notes.
    ///
    /// If several entries are active, all of them are closed and the result
    /// carries a [`MultipleActiveEntries`] warning.
    pub fn close_active_entry(&mut self, notes: &str) -> Result<ClockOut, DbError> {
        self.close_active_entry_at(notes, Utc::now())
    }

    /// Clocks out with an explicit clock-out time.
    pub fn close_active_entry_at(
        &mut self,
        notes: &str,
        time_out: DateTime<Utc>,
    ) -> Result<ClockOut, DbError> {
        // Stored with millisecond precision; report exactly what was stored.
        let time_out = time_out.trunc_subsecs(3);
        let tx = self.conn.transaction()?;
        let mut ids = {
            let mut stmt = tx.prepare(
                "SELECT id FROM timesheet WHERE time_out IN (?, ?) ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![ACTIVE_SENTINEL, LEGACY_ACTIVE_SENTINEL], |row| {
                row.get::<_, i64>(0)
            })?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(EntryId::new(row?));
            }
            ids
        };
        let Some(id) = ids.pop() else {
            return Err(DbError::NoActiveEntry);
        };

        tx.execute(
            "UPDATE timesheet SET notes = ?, time_out = ? WHERE time_out IN (?, ?)",
            params![
                notes,
                format_timestamp(time_out),
                ACTIVE_SENTINEL,
                LEGACY_ACTIVE_SENTINEL,
            ],
        )?;
        tx.commit()?;

        let clock_out = ClockOut {
            id,
            also_closed: ids,
            time_out,
        };
        if let Some(warning) = clock_out.warning() {
            tracing::warn!(%warning, "recovered from multiple active entries");
        }
        tracing::debug!(%id, "clocked out");
        Ok(clock_out)
    }

    /// Returns the active entry, if any.
    ///
    /// If several are active, the most recently inserted one is returned.
    pub fn get_active_entry(&self) -> Result<Option<Entry>, DbError> {
        let entries = self.query_entries(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM timesheet WHERE time_out IN (?, ?) ORDER BY id DESC LIMIT 1"
            ),
            params![ACTIVE_SENTINEL, LEGACY_ACTIVE_SENTINEL],
        )?;
        Ok(entries.into_iter().next())
    }

    /// Lists every distinct task and project name.
    pub fn distinct_tasks_and_projects(&self) -> Result<ItemNames, DbError> {
        let mut stmt = self.conn.prepare("SELECT task, project FROM timesheet")?;
        let rows = stmt.query_map([], |row| {
            let task: Option<String> = row.get(0)?;
            let project: Option<String> = row.get(1)?;
            Ok((task, project))
        })?;
        let mut names = ItemNames::default();
        for row in rows {
            let (task, project) = row?;
            names.tasks.extend(task);
            names.projects.extend(project);
        }
        Ok(names)
    }

    /// Lists entries whose task or project equals `value`, newest first.
    pub fn entries_matching(&self, field: ItemField, value: &str) -> Result<Vec<Entry>, DbError> {
        // The column name comes from a closed enum, never from the caller.
        let column = field.as_str();
        self.query_entries(
            &format!("SELECT {ENTRY_COLUMNS} FROM timesheet WHERE {column} = ? ORDER BY id DESC"),
            [value],
        )
    }

    /// Returns the most recently inserted entry.
    ///
    /// Fails with [`DbError::EmptyLedger`] when nothing has been recorded.
    pub fn most_recent_entry(&self) -> Result<Entry, DbError> {
        Ok(self.newest_entry()?.ok_or(EmptyLedger)?)
    }

    fn newest_entry(&self) -> Result<Option<Entry>, DbError> {
        let entries = self.query_entries(
            &format!("SELECT {ENTRY_COLUMNS} FROM timesheet ORDER BY id DESC LIMIT 1"),
            [],
        )?;
        Ok(entries.into_iter().next())
    }

    /// Lists every entry in insertion order.
    pub fn list_entries(&self) -> Result<Vec<Entry>, DbError> {
        self.query_entries(
            &format!("SELECT {ENTRY_COLUMNS} FROM timesheet ORDER BY id ASC"),
            [],
        )
    }

    /// Fetches a single entry by ID.
    pub fn entry(&self, id: EntryId) -> Result<Option<Entry>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM timesheet WHERE id = ?"),
                [id.get()],
                EntryRow::from_row,
            )
            .optional()?;
        row.map(EntryRow::into_entry).transpose()
    }

    fn query_entries<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Entry>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, EntryRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }
}

impl Ledger for Database {
    type Error = DbError;

    fn active_entry(&self) -> Result<Option<Entry>, DbError> {
        self.get_active_entry()
    }

    fn latest_entry(&self) -> Result<Option<Entry>, DbError> {
        self.newest_entry()
    }

    fn entries_matching(&self, field: ItemField, value: &str) -> Result<Vec<Entry>, DbError> {
        Self::entries_matching(self, field, value)
    }
}

fn is_active_sentinel(timestamp: &str) -> bool {
    timestamp == ACTIVE_SENTINEL || timestamp == LEGACY_ACTIVE_SENTINEL
}

fn parse_timestamp(timestamp: &str, entry_id: i64) -> Result<DateTime<Utc>, DbError> {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(source) => parse_legacy_timestamp(timestamp).ok_or_else(|| DbError::TimestampParse {
            entry_id,
            timestamp: timestamp.to_string(),
            source,
        }),
    }
}

fn parse_legacy_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(timestamp, LEGACY_TIMESTAMP_FORMAT).ok()?;
    Some(
        naive
            .and_local_timezone(Local)
            .earliest()
            .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc)),
    )
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

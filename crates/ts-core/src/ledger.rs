//! The storage seam between the clock ledger and time accounting.

use thiserror::Error;

use crate::entry::Entry;
use crate::types::ItemField;

/// A query that needs history found none.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no timesheet entries recorded")]
pub struct EmptyLedger;

/// Read access to recorded entries.
///
/// This trait allows accounting to work with different stores
/// (e.g., the `SQLite` ledger in ts-db, or in-memory test fixtures).
pub trait Ledger {
    /// Store-specific error. Must be able to carry [`EmptyLedger`].
    type Error: From<EmptyLedger>;

    /// Returns the entry that has not been clocked out, if any.
    fn active_entry(&self) -> Result<Option<Entry>, Self::Error>;

    /// Returns the most recently inserted entry, if any.
    fn latest_entry(&self) -> Result<Option<Entry>, Self::Error>;

    /// Returns every entry whose `field` equals `value`.
    fn entries_matching(&self, field: ItemField, value: &str) -> Result<Vec<Entry>, Self::Error>;
}

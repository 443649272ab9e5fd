//! Derived, read-only views over a [`Ledger`].

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::accounting::{ItemTotals, week_start};
use crate::entry::Entry;
use crate::ledger::{EmptyLedger, Ledger};
use crate::types::{EntryId, ItemField, ProjectName, TaskName};

/// Display format for the clock-in time of the running entry.
pub const TIME_IN_FORMAT: &str = "%A  %d/%m/%y  %H:%M";

/// The running entry, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTask {
    pub id: EntryId,
    pub task: TaskName,
    pub project: ProjectName,
    pub notes: String,
    pub time_in: DateTime<Utc>,
    /// `time_in` rendered with [`TIME_IN_FORMAT`] in the display time zone.
    pub time_in_display: String,
}

impl CurrentTask {
    fn from_entry<Tz>(entry: Entry, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let time_in_display = entry
            .time_in
            .with_timezone(tz)
            .format(TIME_IN_FORMAT)
            .to_string();
        Self {
            id: entry.id,
            task: entry.task,
            project: entry.project,
            notes: entry.notes,
            time_in: entry.time_in,
            time_in_display,
        }
    }
}

/// Returns the running entry formatted for the given time zone.
pub fn current_task_display_in<L, Tz>(ledger: &L, tz: &Tz) -> Result<Option<CurrentTask>, L::Error>
where
    L: Ledger,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    Ok(ledger
        .active_entry()?
        .map(|entry| CurrentTask::from_entry(entry, tz)))
}

/// Returns the running entry formatted in local time.
pub fn current_task_display<L: Ledger>(ledger: &L) -> Result<Option<CurrentTask>, L::Error> {
    current_task_display_in(ledger, &Local)
}

/// Task and project of the most recently created entry.
///
/// Fails with [`EmptyLedger`] when nothing has been recorded.
pub fn most_recent_summary<L: Ledger>(ledger: &L) -> Result<(TaskName, ProjectName), L::Error> {
    let entry = ledger.latest_entry()?.ok_or(EmptyLedger)?;
    Ok((entry.task, entry.project))
}

/// Week and all-time totals for one task or project, as of `now`.
pub fn item_totals_at<L: Ledger>(
    ledger: &L,
    field: ItemField,
    value: &str,
    now: DateTime<Utc>,
    week_start: DateTime<Utc>,
) -> Result<ItemTotals, L::Error> {
    let entries = ledger.entries_matching(field, value)?;
    Ok(ItemTotals::from_entries_at(&entries, now, week_start))
}

/// Week and all-time totals for one task or project.
pub fn item_totals<L: Ledger>(
    ledger: &L,
    field: ItemField,
    value: &str,
) -> Result<ItemTotals, L::Error> {
    let now = Utc::now();
    item_totals_at(ledger, field, value, now, week_start(now))
}

/// Totals for the task and project of the most recent entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsSummary {
    pub task: TaskName,
    pub project: ProjectName,
    pub task_totals: ItemTotals,
    pub project_totals: ItemTotals,
}

/// Totals for the most recent task and project, as of `now`.
///
/// Returns `None` when nothing has been recorded yet.
pub fn totals_summary_at<L: Ledger>(
    ledger: &L,
    now: DateTime<Utc>,
    week_start: DateTime<Utc>,
) -> Result<Option<TotalsSummary>, L::Error> {
    let Some(latest) = ledger.latest_entry()? else {
        return Ok(None);
    };
    let task_totals = item_totals_at(ledger, ItemField::Task, latest.task.as_str(), now, week_start)?;
    let project_totals = item_totals_at(
        ledger,
        ItemField::Project,
        latest.project.as_str(),
        now,
        week_start,
    )?;
    Ok(Some(TotalsSummary {
        task: latest.task,
        project: latest.project,
        task_totals,
        project_totals,
    }))
}

/// Totals for the most recent task and project.
pub fn totals_summary<L: Ledger>(ledger: &L) -> Result<Option<TotalsSummary>, L::Error> {
    let now = Utc::now();
    totals_summary_at(ledger, now, week_start(now))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, FixedOffset};

    use crate::entry::EntryStatus;

    struct MemoryLedger(Vec<Entry>);

    impl Ledger for MemoryLedger {
        type Error = EmptyLedger;

        fn active_entry(&self) -> Result<Option<Entry>, Self::Error> {
            Ok(self.0.iter().rev().find(|e| e.is_active()).cloned())
        }

        fn latest_entry(&self) -> Result<Option<Entry>, Self::Error> {
            Ok(self.0.iter().max_by_key(|e| e.id).cloned())
        }

        fn entries_matching(
            &self,
            field: ItemField,
            value: &str,
        ) -> Result<Vec<Entry>, Self::Error> {
            Ok(self
                .0
                .iter()
                .filter(|e| e.field(field) == value)
                .cloned()
                .collect())
        }
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn entry(id: i64, task: &str, project: &str, span: (DateTime<Utc>, Option<DateTime<Utc>>)) -> Entry {
        Entry {
            id: EntryId::new(id),
            task: TaskName::new(task).unwrap(),
            project: ProjectName::new(project).unwrap(),
            notes: format!("notes {id}"),
            time_in: span.0,
            status: span
                .1
                .map_or(EntryStatus::Active, |time_out| EntryStatus::Closed { time_out }),
        }
    }

    #[test]
    fn current_task_formats_time_in() {
        let ledger = MemoryLedger(vec![
            entry(1, "Review", "Paper", (ts(12, 9), Some(ts(12, 10)))),
            entry(2, "Write spec", "Paper", (ts(13, 9), None)),
        ]);
        let tz = FixedOffset::east_opt(3600).unwrap();

        let current = current_task_display_in(&ledger, &tz).unwrap().unwrap();
        assert_eq!(current.id, EntryId::new(2));
        assert_eq!(current.task.as_str(), "Write spec");
        assert_eq!(current.notes, "notes 2");
        assert_eq!(current.time_in_display, "Tuesday  13/10/26  10:00");
    }

    #[test]
    fn current_task_is_none_when_clocked_out() {
        let ledger = MemoryLedger(vec![entry(1, "Review", "Paper", (ts(12, 9), Some(ts(12, 10))))]);
        assert_eq!(current_task_display_in(&ledger, &Utc).unwrap(), None);
    }

    #[test]
    fn most_recent_summary_uses_greatest_id() {
        // Entry 2 clocked in earlier than entry 1 but was inserted later.
        let ledger = MemoryLedger(vec![
            entry(1, "Review", "Paper", (ts(13, 9), Some(ts(13, 10)))),
            entry(2, "Backfill", "Admin", (ts(12, 9), Some(ts(12, 10)))),
        ]);
        let (task, project) = most_recent_summary(&ledger).unwrap();
        assert_eq!(task.as_str(), "Backfill");
        assert_eq!(project.as_str(), "Admin");
    }

    #[test]
    fn most_recent_summary_on_empty_ledger_fails() {
        let ledger = MemoryLedger(Vec::new());
        assert_eq!(most_recent_summary(&ledger), Err(EmptyLedger));
    }

    #[test]
    fn project_totals_split_by_week() {
        // Two tasks on the same project in different weeks.
        let ledger = MemoryLedger(vec![
            entry(1, "Outline", "Paper", (ts(5, 9), Some(ts(5, 12)))),
            entry(2, "Write spec", "Paper", (ts(13, 9), Some(ts(13, 11)))),
            entry(3, "Email", "Admin", (ts(13, 11), Some(ts(13, 12)))),
        ]);

        let totals = item_totals_at(&ledger, ItemField::Project, "Paper", ts(13, 12), ts(12, 0)).unwrap();
        assert_eq!(totals.entry_count, 2);
        assert_eq!(totals.week, Duration::hours(2));
        assert_eq!(totals.total, Duration::hours(5));
    }

    #[test]
    fn item_totals_for_unknown_item_are_empty() {
        let ledger = MemoryLedger(vec![entry(1, "Outline", "Paper", (ts(5, 9), Some(ts(5, 12))))]);
        let totals = item_totals_at(&ledger, ItemField::Task, "Nope", ts(13, 12), ts(12, 0)).unwrap();
        assert!(totals.is_empty());
        assert_eq!(totals.total, Duration::zero());
    }

    #[test]
    fn totals_summary_covers_latest_task_and_project() {
        let ledger = MemoryLedger(vec![
            entry(1, "Outline", "Paper", (ts(5, 9), Some(ts(5, 12)))),
            entry(2, "Write spec", "Paper", (ts(13, 9), None)),
        ]);

        let summary = totals_summary_at(&ledger, ts(13, 10), ts(12, 0))
            .unwrap()
            .unwrap();
        assert_eq!(summary.task.as_str(), "Write spec");
        assert_eq!(summary.task_totals.total, Duration::hours(1));
        assert_eq!(summary.task_totals.week, Duration::hours(1));
        assert_eq!(summary.project.as_str(), "Paper");
        assert_eq!(summary.project_totals.total, Duration::hours(4));
        assert_eq!(summary.project_totals.week, Duration::hours(1));
    }

    #[test]
    fn totals_summary_on_empty_ledger_is_none() {
        let ledger = MemoryLedger(Vec::new());
        assert_eq!(totals_summary_at(&ledger, ts(13, 10), ts(12, 0)).unwrap(), None);
    }
}

//! Time accounting over timesheet entries.
//!
//! Pure functions: every input is passed in, nothing is persisted.
//!
//! # Algorithm Summary
//!
//! - An entry spans `time_in` to its effective time out (the clock-out time,
//!   or "now" while it is still running).
//! - Total time sums every span.
//! - Week time clips every span to the current calendar week, which starts
//!   at the most recent Monday 00:00 local time.
//!
//! Each span is clamped at zero, so a clock that went backwards never
//! produces negative time and week time never exceeds total time.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::entry::Entry;

/// Longest stretch of local time a zone transition can skip.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Converts the start of a local date to UTC.
///
/// An ambiguous midnight (clocks set back) resolves to the earlier instant.
/// A skipped midnight (clocks set forward) resolves to the first local time
/// that exists on that date, which is the instant of the transition.
fn midnight_to_utc<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=MAX_GAP_MINUTES)
        .map(|minute| midnight + Duration::minutes(minute))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// Start of the calendar week containing `now`, in the given time zone.
///
/// Weeks start on Monday at 00:00.
pub fn week_start_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let today = now.with_timezone(tz).date_naive();
    let days_since_monday = today.weekday().num_days_from_monday();
    let monday = today - Duration::days(i64::from(days_since_monday));
    midnight_to_utc(monday, tz)
}

/// Start of the current calendar week in local time.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    week_start_in(now, &Local)
}

fn non_negative(duration: Duration) -> Duration {
    duration.max(Duration::zero())
}

/// Time an entry has run as of `now`.
pub fn entry_span(entry: &Entry, now: DateTime<Utc>) -> Duration {
    non_negative(entry.effective_time_out(now) - entry.time_in)
}

/// Portion of an entry that falls on or after `week_start`.
pub fn entry_week_span(entry: &Entry, now: DateTime<Utc>, week_start: DateTime<Utc>) -> Duration {
    let end = entry.effective_time_out(now);
    if end < week_start {
        return Duration::zero();
    }
    non_negative(end - entry.time_in.max(week_start))
}

/// Sums the time of every entry as of `now`.
///
/// Active entries count as running through `now`.
pub fn total_time_at(entries: &[Entry], now: DateTime<Utc>) -> Duration {
    entries
        .iter()
        .fold(Duration::zero(), |acc, entry| acc + entry_span(entry, now))
}

/// Sums the time of every entry that falls within the week starting at
/// `week_start`, as of `now`.
pub fn week_time_at(entries: &[Entry], now: DateTime<Utc>, week_start: DateTime<Utc>) -> Duration {
    entries.iter().fold(Duration::zero(), |acc, entry| {
        acc + entry_week_span(entry, now, week_start)
    })
}

/// Sums the time of every entry, treating active entries as running until now.
pub fn total_time(entries: &[Entry]) -> Duration {
    total_time_at(entries, Utc::now())
}

/// Sums the time of every entry within the current local calendar week.
pub fn week_time(entries: &[Entry]) -> Duration {
    let now = Utc::now();
    week_time_at(entries, now, week_start(now))
}

/// Week and all-time totals for one task or project.
///
/// `entry_count` distinguishes "nothing recorded" from a real zero total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTotals {
    pub entry_count: usize,
    pub total: Duration,
    pub week: Duration,
}

impl ItemTotals {
    /// Computes totals for the given entries.
    pub fn from_entries_at(
        entries: &[Entry],
        now: DateTime<Utc>,
        week_start: DateTime<Utc>,
    ) -> Self {
        Self {
            entry_count: entries.len(),
            total: total_time_at(entries, now),
            week: week_time_at(entries, now, week_start),
        }
    }

    /// Returns true if no entries contributed to these totals.
    pub const fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}

//! History command listing every entry.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};

use ts_core::Entry;
use ts_db::Database;

const TIME_FORMAT: &str = "%H:%M  %d/%m/%y";
const RUNNING: &str = "Running...";
const HEADER: [&str; 5] = ["Task", "Project", "Notes", "Time In", "Time Out"];

fn format_time<Tz>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    time.with_timezone(tz).format(TIME_FORMAT).to_string()
}

fn row<Tz>(entry: &Entry, tz: &Tz) -> [String; 5]
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let time_out = entry
        .time_out()
        .map_or_else(|| RUNNING.to_string(), |time_out| format_time(time_out, tz));
    [
        entry.task.to_string(),
        entry.project.to_string(),
        entry.notes.clone(),
        format_time(entry.time_in, tz),
        time_out,
    ]
}

/// Renders entries as an aligned table, times shown in `tz`.
pub fn render<W, Tz>(writer: &mut W, entries: &[Entry], tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if entries.is_empty() {
        writeln!(writer, "No entries recorded.")?;
        return Ok(());
    }

    let rows: Vec<[String; 5]> = std::iter::once(HEADER.map(String::from))
        .chain(entries.iter().map(|entry| row(entry, tz)))
        .collect();

    let mut widths = [0usize; 5];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in &rows {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let entries = db.list_entries()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }
    render(writer, &entries, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn ts(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn history_on_empty_ledger() {
        let mut output = Vec::new();
        render(&mut output, &[], &Utc).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"No entries recorded.");
    }

    #[test]
    fn history_marks_running_entry() {
        let mut db = Database::open_in_memory().unwrap();
        db.add_entry_at("Outline", "Paper", "first pass", ts(12, 9, 0)).unwrap();
        db.close_active_entry_at("first pass", ts(12, 10, 30)).unwrap();
        db.add_entry_at("Write spec", "Paper", "", ts(13, 9, 15)).unwrap();

        let mut output = Vec::new();
        render(&mut output, &db.list_entries().unwrap(), &Utc).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Task        Project  Notes       Time In          Time Out
        Outline     Paper    first pass  09:00  12/10/26  10:30  12/10/26
        Write spec  Paper                09:15  13/10/26  Running...
        ");
    }

    #[test]
    fn history_json_lists_entries() {
        let mut db = Database::open_in_memory().unwrap();
        db.add_entry_at("Outline", "Paper", "", ts(12, 9, 0)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, true).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json[0]["task"], "Outline");
        assert_eq!(json[0]["time_in"], "2026-10-12T09:00:00Z");
        assert_eq!(json[0]["status"]["state"], "active");
    }
}

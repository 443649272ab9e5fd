//! Totals command.
//!
//! Shows time spent this week (since Monday 00:00 local time) and in total,
//! at hour granularity. Covers the most recent task and project unless one
//! item is named.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};
use clap::Args;

use ts_core::{ItemField, ItemTotals, TotalsSummary, item_totals, totals_summary};
use ts_db::Database;

#[derive(Debug, Args)]
pub struct TotalsArgs {
    /// Which kind of item to total: `task` or `project`.
    #[arg(requires = "name")]
    pub field: Option<ItemField>,
    /// Task or project name.
    pub name: Option<String>,
}

/// Formats a duration as whole days and hours.
///
/// Days are omitted when zero; minutes are dropped. Negative durations are
/// treated as zero.
pub fn format_hours(duration: Duration) -> String {
    let duration = duration.max(Duration::zero());
    let days = duration.num_days();
    let hours = (duration - Duration::days(days)).num_hours();
    if days > 0 {
        format!("Days: {days} Hours: {hours}")
    } else {
        format!("Hours: {hours}")
    }
}

fn write_item<W: Write>(writer: &mut W, name: &str, totals: &ItemTotals) -> Result<()> {
    writeln!(writer, "{name} this week")?;
    writeln!(writer, "  {}", format_hours(totals.week))?;
    writeln!(writer, "{name} total")?;
    writeln!(writer, "  {}", format_hours(totals.total))?;
    Ok(())
}

/// Renders a totals summary.
pub fn render<W: Write>(writer: &mut W, summary: Option<&TotalsSummary>) -> Result<()> {
    let Some(summary) = summary else {
        writeln!(writer, "No timesheet details saved.")?;
        return Ok(());
    };
    write_item(writer, summary.task.as_str(), &summary.task_totals)?;
    write_item(writer, summary.project.as_str(), &summary.project_totals)?;
    Ok(())
}

/// Renders the totals of one named task or project.
pub fn render_item<W: Write>(
    writer: &mut W,
    field: ItemField,
    name: &str,
    totals: &ItemTotals,
) -> Result<()> {
    if totals.is_empty() {
        writeln!(writer, "No entries for {field} {name}.")?;
        return Ok(());
    }
    write_item(writer, name, totals)
}

fn format_week_header(week_start: DateTime<Utc>, timezone: &str) -> String {
    let monday = week_start.with_timezone(&Local).format("%d/%m/%y");
    format!("Totals (week from Monday {monday}, {timezone})")
}

pub fn run<W: Write>(writer: &mut W, db: &Database, args: &TotalsArgs) -> Result<()> {
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    writeln!(
        writer,
        "{}",
        format_week_header(ts_core::week_start(Utc::now()), &timezone)
    )?;

    match (args.field, args.name.as_deref()) {
        (Some(field), Some(name)) => {
            let totals = item_totals(db, field, name)?;
            render_item(writer, field, name, &totals)
        }
        _ => render(writer, totals_summary(db)?.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;
    use insta::assert_snapshot;
    use ts_core::{ProjectName, TaskName};

    use crate::{Cli, Commands};

    fn most_recent() -> TotalsArgs {
        TotalsArgs {
            field: None,
            name: None,
        }
    }

    fn parse_totals(args: &[&str]) -> Result<TotalsArgs, clap::Error> {
        let cli = Cli::try_parse_from(["ts", "totals"].into_iter().chain(args.iter().copied()))?;
        match cli.command {
            Some(Commands::Totals(args)) => Ok(args),
            other => panic!("expected totals command, got {other:?}"),
        }
    }

    #[test]
    fn format_hours_drops_minutes() {
        assert_eq!(format_hours(Duration::zero()), "Hours: 0");
        assert_eq!(format_hours(Duration::minutes(59)), "Hours: 0");
        assert_eq!(format_hours(Duration::minutes(150)), "Hours: 2");
    }

    #[test]
    fn format_hours_shows_days() {
        assert_eq!(format_hours(Duration::hours(24)), "Days: 1 Hours: 0");
        assert_eq!(format_hours(Duration::hours(51)), "Days: 2 Hours: 3");
    }

    #[test]
    fn format_hours_clamps_negative() {
        assert_eq!(format_hours(Duration::hours(-3)), "Hours: 0");
    }

    #[test]
    fn render_empty_ledger() {
        let mut output = Vec::new();
        render(&mut output, None).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"No timesheet details saved.");
    }

    #[test]
    fn render_task_and_project_totals() {
        let summary = TotalsSummary {
            task: TaskName::new("Write spec").unwrap(),
            project: ProjectName::new("Paper").unwrap(),
            task_totals: ItemTotals {
                entry_count: 1,
                total: Duration::hours(2),
                week: Duration::hours(2),
            },
            project_totals: ItemTotals {
                entry_count: 3,
                total: Duration::hours(30),
                week: Duration::hours(5),
            },
        };

        let mut output = Vec::new();
        render(&mut output, Some(&summary)).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Write spec this week
          Hours: 2
        Write spec total
          Hours: 2
        Paper this week
          Hours: 5
        Paper total
          Days: 1 Hours: 6
        ");
    }

    #[test]
    fn run_reports_most_recent_item() {
        let mut db = Database::open_in_memory().unwrap();
        db.add_entry("Outline", "Paper", "").unwrap();
        db.close_active_entry("").unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &most_recent()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Totals (week from Monday "));
        assert!(output.contains("Outline this week\n  Hours: 0\n"));
        assert!(output.contains("Paper total\n  Hours: 0\n"));
    }

    #[test]
    fn named_item_is_parsed_from_arguments() {
        let args = parse_totals(&["project", "Paper"]).unwrap();
        assert_eq!(args.field, Some(ItemField::Project));
        assert_eq!(args.name.as_deref(), Some("Paper"));

        let args = parse_totals(&[]).unwrap();
        assert_eq!(args.field, None);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse_totals(&["notes", "draft"]).unwrap_err();
        assert!(err.to_string().contains("invalid item field: notes"), "{err}");
    }

    #[test]
    fn field_without_name_is_rejected() {
        assert!(parse_totals(&["task"]).is_err());
    }

    #[test]
    fn run_reports_named_item() {
        let mut db = Database::open_in_memory().unwrap();
        db.add_entry("Outline", "Paper", "").unwrap();
        db.close_active_entry("").unwrap();
        db.add_entry("Email", "Admin", "").unwrap();
        db.close_active_entry("").unwrap();

        let mut output = Vec::new();
        let args = parse_totals(&["task", "Outline"]).unwrap();
        run(&mut output, &db, &args).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Outline this week\n  Hours: 0\n"), "{output}");
        assert!(!output.contains("Email"), "{output}");
    }

    #[test]
    fn render_item_without_entries() {
        let mut output = Vec::new();
        let totals = ItemTotals {
            entry_count: 0,
            total: Duration::zero(),
            week: Duration::zero(),
        };
        render_item(&mut output, ItemField::Task, "Unknown", &totals).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"No entries for task Unknown.");
    }
}

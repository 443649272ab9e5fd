//! Clock in and clock out commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;

use ts_core::accounting::entry_span;
use ts_core::{ProjectName, TaskName, current_task_display};
use ts_db::Database;

use super::status::write_current;
use super::totals::format_hours;

#[derive(Debug, Args)]
pub struct ClockInArgs {
    /// Task to clock in to.
    #[arg(short, long)]
    pub task: String,
    /// Project the task belongs to.
    #[arg(short, long)]
    pub project: String,
    /// Optional notes; can be replaced when clocking out.
    #[arg(short, long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct ClockOutArgs {
    /// Final notes for the entry. Keeps the current notes when omitted.
    #[arg(short, long)]
    pub notes: Option<String>,
}

pub fn clock_in<W: Write>(writer: &mut W, db: &mut Database, args: &ClockInArgs) -> Result<()> {
    let task = TaskName::new(args.task.as_str())?;
    let project = ProjectName::new(args.project.as_str())?;
    if let Some(active) = db.get_active_entry()? {
        bail!(
            "already clocked in to {} - {}; clock out first",
            active.task,
            active.project
        );
    }

    let id = db.add_entry(
        task.as_str(),
        project.as_str(),
        args.notes.as_deref().unwrap_or(""),
    )?;
    tracing::debug!(%id, "entry added");

    let current = current_task_display(&*db)?.context("clocked-in entry is not active")?;
    writeln!(writer, "Clocked in.")?;
    write_current(writer, &current)
}

pub fn clock_out<W: Write>(writer: &mut W, db: &mut Database, args: &ClockOutArgs) -> Result<()> {
    let Some(active) = db.get_active_entry()? else {
        bail!("not clocked in");
    };
    let notes = args.notes.as_deref().unwrap_or(&active.notes);

    let clock_out = db.close_active_entry(notes)?;
    if let Some(warning) = clock_out.warning() {
        writeln!(writer, "Warning: {warning}")?;
    }

    let entry = db
        .entry(clock_out.id)?
        .with_context(|| format!("entry {} missing after clock out", clock_out.id))?;
    writeln!(
        writer,
        "Clocked out of {} - {} ({})",
        entry.task,
        entry.project,
        format_hours(entry_span(&entry, clock_out.time_out))
    )?;
    Ok(())
}

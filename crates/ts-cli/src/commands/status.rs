//! Status command for showing the running task.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use ts_core::{CurrentTask, current_task_display};
use ts_db::Database;

/// Writes the "Currently doing" block for the running task.
pub fn write_current<W: Write>(writer: &mut W, current: &CurrentTask) -> Result<()> {
    writeln!(writer, "Currently doing:")?;
    writeln!(writer, "{} - {}", current.task, current.project)?;
    writeln!(writer, "Since: {}", current.time_in_display)?;
    if !current.notes.is_empty() {
        writeln!(writer, "Notes: {}", current.notes)?;
    }
    Ok(())
}

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    writeln!(writer, "Timesheet status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    match current_task_display(db)? {
        Some(current) => write_current(writer, &current)?,
        None => writeln!(writer, "Not clocked in.")?,
    }
    Ok(())
}

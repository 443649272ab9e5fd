//! Names command listing every recorded task and project.

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::Result;

use ts_db::Database;

fn write_section<W: Write>(writer: &mut W, title: &str, names: &BTreeSet<String>) -> Result<()> {
    writeln!(writer, "{title}:")?;
    for name in names {
        writeln!(writer, "- {name}")?;
    }
    Ok(())
}

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let names = db.distinct_tasks_and_projects()?;
    if names.tasks.is_empty() && names.projects.is_empty() {
        writeln!(writer, "No tasks or projects recorded.")?;
        return Ok(());
    }
    write_section(writer, "Tasks", &names.tasks)?;
    write_section(writer, "Projects", &names.projects)
}

//! CLI subcommand implementations.

pub mod clock;
pub mod history;
pub mod names;
pub mod status;
pub mod totals;

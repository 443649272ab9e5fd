//! Timesheet CLI library.
//!
//! This crate provides the command-line front end for the timesheet.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;

//! CLI module for the SDDC lifecycle tool.
//!
//! This module provides the command-line interface: argument parsing and
//! rendering of lifecycle outcomes.

mod commands;
mod output;

pub use commands::{Action, Cli, OutputFormat};
pub use output::OutputFormatter;

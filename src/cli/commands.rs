//! CLI command definitions.
//!
//! Exactly one action flag is required per invocation; clap reports a missing
//! or unknown flag as a usage error with a non-zero exit code.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// vmc-sddc - create, inspect or delete your VMware Cloud SDDC.
#[derive(Parser, Debug)]
#[command(name = "vmc-sddc")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["create", "delete", "status"])
))]
pub struct Cli {
    /// Ensure the SDDC exists (create it if missing), then describe it.
    #[arg(short = 'c', long)]
    pub create: bool,

    /// Delete the SDDC if one exists.
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// Describe the SDDC without changing anything.
    #[arg(short = 's', long)]
    pub status: bool,

    /// Path to the configuration file.
    #[arg(long, env = "VMC_SDDC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Return as soon as the provider accepts a create or delete.
    #[arg(long)]
    pub no_wait: bool,

    /// Overall wait deadline in seconds (overrides poll.timeout_secs).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// The lifecycle action selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Locate or create, then describe.
    EnsureCreated,
    /// Delete if present.
    Delete,
    /// Describe only.
    Describe,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Returns the selected action.
    #[must_use]
    pub const fn action(&self) -> Action {
        if self.delete {
            Action::Delete
        } else if self.status {
            Action::Describe
        } else {
            Action::EnsureCreated
        }
    }
}

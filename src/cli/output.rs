//! Output formatting for CLI commands.
//!
//! This module renders lifecycle outcomes for the operator, either as
//! human-readable text or as JSON for scripting.

use colored::Colorize;
use std::fmt::Write as _;
use std::io::Write as _;
use tabled::{Table, Tabled};

use crate::error::Result;
use crate::vmc::{CreateOutcome, DeleteOutcome, LifecycleState, SddcDescriptor};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Descriptor row for table display.
#[derive(Tabled)]
struct DescriptorRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the outcome of an ensure-create run.
    #[must_use]
    pub fn format_create(&self, outcome: &CreateOutcome) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcome).unwrap_or_default(),
            OutputFormat::Text => match outcome {
                CreateOutcome::Existing(descriptor) => Self::descriptor_text("SDDC", descriptor),
                CreateOutcome::Created(descriptor) => {
                    Self::descriptor_text("SDDC created", descriptor)
                }
                CreateOutcome::Accepted { task_id } => format!(
                    "{} SDDC creation accepted{}; provisioning continues in the background.\n",
                    "✓".green(),
                    Self::task_suffix(task_id.as_deref())
                ),
            },
        }
    }

    /// Formats the outcome of a delete run.
    #[must_use]
    pub fn format_delete(&self, outcome: &DeleteOutcome) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcome).unwrap_or_default(),
            OutputFormat::Text => match outcome {
                DeleteOutcome::NothingToDelete => {
                    format!("{} Nothing to delete.\n", "✓".green())
                }
                DeleteOutcome::Accepted { sddc_id, task_id } => format!(
                    "{} Deletion of SDDC {sddc_id} accepted{}.\n",
                    "✓".green(),
                    Self::task_suffix(task_id.as_deref())
                ),
                DeleteOutcome::Deleted { sddc_id } => {
                    format!("{} SDDC {sddc_id} deleted.\n", "✓".green())
                }
            },
        }
    }

    /// Formats the result of a describe-only run.
    #[must_use]
    pub fn format_describe(&self, descriptor: Option<&SddcDescriptor>, owner: &str) -> String {
        match (self.format, descriptor) {
            (OutputFormat::Json, _) => {
                serde_json::to_string_pretty(&descriptor).unwrap_or_default()
            }
            (OutputFormat::Text, Some(descriptor)) => Self::descriptor_text("SDDC", descriptor),
            (OutputFormat::Text, None) => {
                format!("{} No SDDC owned by {owner}.\n", "⚠".yellow())
            }
        }
    }

    /// Writes rendered output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn emit(rendered: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Renders a descriptor as a titled two-column table.
    fn descriptor_text(title: &str, descriptor: &SddcDescriptor) -> String {
        let mut rows = vec![
            DescriptorRow {
                field: "SDDC ID",
                value: descriptor.id.clone(),
            },
            DescriptorRow {
                field: "SDDC Name",
                value: descriptor.name.clone(),
            },
            DescriptorRow {
                field: "State",
                value: Self::format_state(descriptor.state),
            },
            DescriptorRow {
                field: "Cluster",
                value: descriptor.cluster_name.clone(),
            },
            DescriptorRow {
                field: "Number of Hosts",
                value: descriptor.host_count.to_string(),
            },
            DescriptorRow {
                field: "Deployed in",
                value: descriptor.deployment_type.clone(),
            },
            DescriptorRow {
                field: "Region",
                value: descriptor.region.clone(),
            },
        ];

        if let Some(created) = descriptor.created {
            rows.push(DescriptorRow {
                field: "Created",
                value: created.format("%Y-%m-%d %H:%M UTC").to_string(),
            });
        }

        let mut output = String::new();
        let _ = writeln!(output, "\n{title}: {}\n", descriptor.name.bold());
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');
        output
    }

    /// Formats a lifecycle state with color.
    fn format_state(state: LifecycleState) -> String {
        match state {
            LifecycleState::Ready => "ready".green().to_string(),
            LifecycleState::Provisioning | LifecycleState::Deleting => {
                state.to_string().yellow().to_string()
            }
            LifecycleState::Failed => "failed".red().to_string(),
            LifecycleState::Absent | LifecycleState::Deleted | LifecycleState::Unknown => {
                state.to_string().dimmed().to_string()
            }
        }
    }

    fn task_suffix(task_id: Option<&str>) -> String {
        task_id.map_or_else(String::new, |id| format!(" (task {id})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> SddcDescriptor {
        SddcDescriptor {
            id: String::from("s-1"),
            name: String::from("lab"),
            state: LifecycleState::Ready,
            cluster_name: String::from("Cluster-1"),
            host_count: 3,
            deployment_type: String::from("SingleAZ"),
            region: String::from("US_WEST_2"),
            created: None,
        }
    }

    #[test]
    fn test_text_descriptor_lists_every_field() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text)
            .format_create(&CreateOutcome::Existing(descriptor()));

        for expected in ["s-1", "lab", "ready", "Cluster-1", "3", "SingleAZ", "US_WEST_2"] {
            assert!(text.contains(expected), "missing {expected} in:\n{text}");
        }
    }

    #[test]
    fn test_json_create_outcome_is_tagged() {
        let json = OutputFormatter::new(OutputFormat::Json)
            .format_create(&CreateOutcome::Created(descriptor()));
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert_eq!(value["outcome"], "created");
        assert_eq!(value["host_count"], 3);
        assert_eq!(value["state"], "READY");
    }

    #[test]
    fn test_json_delete_outcome() {
        let json = OutputFormatter::new(OutputFormat::Json)
            .format_delete(&DeleteOutcome::NothingToDelete);
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["outcome"], "nothing_to_delete");
    }

    #[test]
    fn test_describe_without_sddc() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_describe(None, "alice");
        assert!(text.contains("No SDDC owned by alice"));

        let json = OutputFormatter::new(OutputFormat::Json).format_describe(None, "alice");
        assert_eq!(json, "null");
    }
}

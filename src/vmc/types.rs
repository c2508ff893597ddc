//! VMC API types and data structures.
//!
//! This module defines the request and response bodies exchanged with the
//! VMC SDDC endpoints. Only the fields this tool reads are modelled; unknown
//! fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::SddcSpec;

/// Entry of the SDDC list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SddcSummary {
    /// Provider-assigned SDDC identifier.
    pub id: String,
    /// User that created the SDDC.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle state as reported in the listing.
    #[serde(default, deserialize_with = "state_or_unknown")]
    pub sddc_state: LifecycleState,
}

/// Response of the SDDC detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SddcDetail {
    /// Provider-assigned SDDC identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle state.
    #[serde(default, deserialize_with = "state_or_unknown")]
    pub sddc_state: LifecycleState,
    /// Creation timestamp.
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    /// Provisioned resources; absent while the SDDC is initializing.
    #[serde(default)]
    pub resource_config: Option<ResourceConfig>,
}

/// Provisioned resources of an SDDC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Clusters, primary first.
    #[serde(default)]
    pub clusters: Option<Vec<Cluster>>,
    /// Deployment type (e.g. `SingleAZ`).
    #[serde(default)]
    pub deployment_type: Option<String>,
    /// Provider region.
    #[serde(default)]
    pub region: Option<String>,
    /// ESX host entries; only their count is used.
    #[serde(default)]
    pub esx_hosts: Option<Vec<serde_json::Value>>,
}

/// A vSphere cluster inside an SDDC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster name; may be null while the cluster is being built.
    #[serde(default)]
    pub cluster_name: Option<String>,
    /// Cluster identifier.
    #[serde(default)]
    pub cluster_id: Option<String>,
}

/// Lifecycle state of an SDDC.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// No SDDC exists (never sent by the API).
    Absent,
    /// Provisioning is in progress.
    #[serde(alias = "INITIALIZATION")]
    Provisioning,
    /// SDDC is ready for use.
    Ready,
    /// Deletion is in progress.
    Deleting,
    /// SDDC has been deleted.
    Deleted,
    /// Provisioning failed or was cancelled.
    #[serde(alias = "CANCELED")]
    Failed,
    /// Unrecognised state.
    #[default]
    #[serde(other)]
    Unknown,
}

impl LifecycleState {
    /// Returns true if provisioning has finished, successfully or not.
    ///
    /// An SDDC that vanished while being watched counts as finished.
    #[must_use]
    pub const fn is_terminal_for_create(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Failed | Self::Deleting | Self::Deleted | Self::Absent
        )
    }

    /// Returns true if deletion has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal_for_delete(self) -> bool {
        matches!(self, Self::Absent | Self::Deleted | Self::Failed)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            Self::Absent => "absent",
            Self::Provisioning => "provisioning",
            Self::Ready => "ready",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        write!(f, "{state}")
    }
}

/// Reads a state field, treating `null` like an unrecognised state.
fn state_or_unknown<'de, D>(deserializer: D) -> Result<LifecycleState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LifecycleState>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request to create a new SDDC.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateSddcRequest {
    /// Number of ESX hosts.
    pub num_hosts: u32,
    /// SDDC display name.
    pub name: String,
    /// Cloud provider.
    pub provider: String,
    /// Provider region.
    pub region: String,
    /// Linked customer account and subnet.
    pub account_link_sddc_config: Vec<AccountLinkSddcConfig>,
    /// SDDC type; empty for the provider default.
    pub sddc_type: String,
    /// Deployment type.
    pub deployment_type: String,
    /// Management network CIDR.
    pub vxlan_subnet: String,
}

/// Linkage between the SDDC and a customer cloud account.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccountLinkSddcConfig {
    /// Customer subnets to connect.
    pub customer_subnet_ids: Vec<String>,
    /// Connected cloud account ID.
    pub connected_account_id: String,
}

impl From<&SddcSpec> for CreateSddcRequest {
    fn from(spec: &SddcSpec) -> Self {
        Self {
            num_hosts: spec.num_hosts,
            name: spec.name.clone(),
            provider: spec.provider.clone(),
            region: spec.region.clone(),
            account_link_sddc_config: vec![AccountLinkSddcConfig {
                customer_subnet_ids: vec![spec.subnet_id.clone()],
                connected_account_id: spec.connected_account_id.clone(),
            }],
            sddc_type: spec.sddc_type.clone(),
            deployment_type: spec.deployment_type.clone(),
            vxlan_subnet: spec.vxlan_subnet.clone(),
        }
    }
}

/// Task returned when a create or delete request is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRef {
    /// Task identifier.
    #[serde(default)]
    pub id: Option<String>,
}

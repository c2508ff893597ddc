//! Configuration specification types.
//!
//! These structs map one-to-one onto the YAML configuration file: where to
//! reach VMC and CSP, whose SDDC to manage, what a new SDDC should look like,
//! and how long to wait for provisioning.

use serde::{Deserialize, Serialize};

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VmcConfig {
    /// Endpoints, credentials and ownership.
    pub vmc: VmcSection,
    /// Shape of the SDDC to create.
    pub sddc: SddcSpec,
    /// Poll loop tuning.
    #[serde(default)]
    pub poll: PollConfig,
}

/// Endpoints, credentials and ownership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmcSection {
    /// VMC API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// CSP identity provider base URL.
    #[serde(default = "default_csp_url")]
    pub csp_url: String,
    /// OAuth refresh token; usually supplied through `VMC_REFRESH_TOKEN`.
    #[serde(default)]
    pub refresh_token: String,
    /// Organization ID.
    pub org_id: String,
    /// User name that owns the managed SDDC.
    pub user_name: String,
}

/// Desired SDDC shape, sent on create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SddcSpec {
    /// SDDC display name.
    pub name: String,
    /// Number of ESX hosts.
    #[serde(default = "default_num_hosts")]
    pub num_hosts: u32,
    /// Cloud provider (e.g. `AWS`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider region (e.g. `US_WEST_2`).
    pub region: String,
    /// Customer subnet to link.
    pub subnet_id: String,
    /// Connected cloud account ID.
    pub connected_account_id: String,
    /// Deployment type (e.g. `SingleAZ`).
    #[serde(default = "default_deployment_type")]
    pub deployment_type: String,
    /// Management network CIDR.
    pub vxlan_subnet: String,
    /// SDDC type; empty for the provider default.
    #[serde(default)]
    pub sddc_type: String,
}

/// Poll loop tuning, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollConfig {
    /// First delay between polls.
    #[serde(default = "default_initial_interval")]
    pub initial_interval_secs: u64,
    /// Upper bound on the delay between polls.
    #[serde(default = "default_max_interval")]
    pub max_interval_secs: u64,
    /// Growth factor applied after each poll.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Overall deadline for a wait.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval_secs: default_initial_interval(),
            max_interval_secs: default_max_interval(),
            multiplier: default_multiplier(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    String::from("https://vmc.vmware.com")
}

fn default_csp_url() -> String {
    String::from("https://console.cloud.vmware.com")
}

const fn default_num_hosts() -> u32 {
    1
}

fn default_provider() -> String {
    String::from("AWS")
}

fn default_deployment_type() -> String {
    String::from("SingleAZ")
}

const fn default_initial_interval() -> u64 {
    10
}

const fn default_max_interval() -> u64 {
    60
}

const fn default_multiplier() -> f64 {
    2.0
}

// SDDC provisioning routinely takes well over an hour.
const fn default_timeout() -> u64 {
    7200
}

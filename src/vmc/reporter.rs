//! SDDC state reporting.
//!
//! This module turns the detail response of one SDDC into an
//! [`SddcDescriptor`] value. Descriptors are built fresh on every call and
//! returned by value; nothing is cached between calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, VmcError};

use super::client::VmcClient;
use super::poller::LifecyclePoller;
use super::types::{LifecycleState, SddcDetail};

/// Observed state of one SDDC.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SddcDescriptor {
    /// Provider-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lifecycle state.
    pub state: LifecycleState,
    /// Name of the primary cluster.
    pub cluster_name: String,
    /// Number of ESX hosts.
    pub host_count: usize,
    /// Deployment type.
    pub deployment_type: String,
    /// Provider region.
    pub region: String,
    /// Creation timestamp, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl SddcDescriptor {
    /// Builds a descriptor from a detail response.
    ///
    /// # Errors
    ///
    /// Returns [`VmcError::MissingData`] if the name, resource configuration,
    /// primary cluster or its name, deployment type or region is missing.
    pub fn from_detail(sddc_id: &str, detail: &SddcDetail) -> Result<Self> {
        let name = detail
            .name
            .clone()
            .ok_or_else(|| VmcError::missing(sddc_id, "name"))?;

        let resources = detail
            .resource_config
            .as_ref()
            .ok_or_else(|| VmcError::missing(sddc_id, "resource_config"))?;

        let primary = resources
            .clusters
            .as_deref()
            .and_then(<[_]>::first)
            .ok_or_else(|| VmcError::missing(sddc_id, "resource_config.clusters[0]"))?;
        let cluster_name = primary.cluster_name.clone().ok_or_else(|| {
            VmcError::missing(sddc_id, "resource_config.clusters[0].cluster_name")
        })?;

        let deployment_type = resources
            .deployment_type
            .clone()
            .ok_or_else(|| VmcError::missing(sddc_id, "resource_config.deployment_type"))?;

        let region = resources
            .region
            .clone()
            .ok_or_else(|| VmcError::missing(sddc_id, "resource_config.region"))?;

        let host_count = resources.esx_hosts.as_ref().map_or(0, Vec::len);

        Ok(Self {
            id: sddc_id.to_string(),
            name,
            state: detail.sddc_state,
            cluster_name,
            host_count,
            deployment_type,
            region,
            created: detail.created,
        })
    }
}

/// Fetches and reports SDDC state.
#[derive(Debug, Clone)]
pub struct StateReporter {
    /// VMC API client.
    client: VmcClient,
}

impl StateReporter {
    /// Creates a new state reporter.
    #[must_use]
    pub const fn new(client: VmcClient) -> Self {
        Self { client }
    }

    /// Fetches an SDDC and describes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response lacks a
    /// descriptor field.
    pub async fn describe(&self, sddc_id: &str) -> Result<SddcDescriptor> {
        debug!("Describing SDDC {sddc_id}");
        let detail = self.client.get_sddc(sddc_id).await?;
        SddcDescriptor::from_detail(sddc_id, &detail)
    }
}

#[async_trait]
impl LifecyclePoller for StateReporter {
    async fn poll(&self, sddc_id: &str) -> Result<LifecycleState> {
        match self.client.get_sddc(sddc_id).await {
            Ok(detail) => Ok(detail.sddc_state),
            Err(e) if e.is_not_found() => Ok(LifecycleState::Absent),
            Err(e) => Err(e),
        }
    }
}

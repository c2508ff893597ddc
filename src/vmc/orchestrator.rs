//! Lifecycle orchestration for the owned SDDC.
//!
//! The orchestrator ties the locator, the provisioning calls and the poller
//! together into the three operator actions: ensure the SDDC exists, delete
//! it, or describe it. Descriptors are only reported once the provider says
//! the SDDC is ready; a freshly accepted create is never described.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SddcSpec;
use crate::error::Result;

use super::client::VmcClient;
use super::locator::SddcLocator;
use super::poller::{Backoff, PollPolicy, wait_for_absence, wait_for_ready};
use super::reporter::{SddcDescriptor, StateReporter};
use super::types::CreateSddcRequest;

/// Result of an ensure-create run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CreateOutcome {
    /// The owner already had an SDDC.
    Existing(SddcDescriptor),
    /// A new SDDC was created and is ready.
    Created(SddcDescriptor),
    /// Creation was accepted; provisioning continues without us.
    Accepted {
        /// Provisioning task ID, when reported.
        task_id: Option<String>,
    },
}

/// Result of a delete run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The owner had no SDDC; no delete request was sent.
    NothingToDelete,
    /// Deletion was accepted; it continues without us.
    Accepted {
        /// ID of the SDDC being deleted.
        sddc_id: String,
        /// Deletion task ID, when reported.
        task_id: Option<String>,
    },
    /// The SDDC is gone.
    Deleted {
        /// ID of the deleted SDDC.
        sddc_id: String,
    },
}

/// Drives create, delete and describe for the SDDC owned by one user.
#[derive(Debug, Clone)]
pub struct LifecycleOrchestrator {
    /// VMC API client.
    client: VmcClient,
    /// Owner lookup.
    locator: SddcLocator,
    /// Descriptor source and state poller.
    reporter: StateReporter,
    /// User name that owns the SDDC.
    owner: String,
    /// Backoff and deadline for waits.
    policy: PollPolicy,
    /// Whether to wait for provisioning to finish.
    wait: bool,
}

impl LifecycleOrchestrator {
    /// Creates a new orchestrator for the SDDC owned by `owner`.
    #[must_use]
    pub fn new(client: VmcClient, owner: impl Into<String>) -> Self {
        Self {
            locator: SddcLocator::new(client.clone()),
            reporter: StateReporter::new(client.clone()),
            client,
            owner: owner.into(),
            policy: PollPolicy::default(),
            wait: true,
        }
    }

    /// Sets the poll policy.
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables or disables waiting for asynchronous provisioning.
    #[must_use]
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Makes sure the owner has an SDDC, creating one from `spec` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if any API call fails, the create request is
    /// rejected, provisioning fails, or the wait times out.
    pub async fn ensure_created(&self, spec: &SddcSpec) -> Result<CreateOutcome> {
        if let Some(sddc_id) = self.locator.find_sddc_id(&self.owner).await? {
            if self.wait {
                let mut backoff = Backoff::new(self.policy);
                wait_for_ready(&self.reporter, &sddc_id, &mut backoff).await?;
            }
            let descriptor = self.reporter.describe(&sddc_id).await?;
            return Ok(CreateOutcome::Existing(descriptor));
        }

        info!("SDDC not found, creating {} for {}", spec.name, self.owner);
        let request = CreateSddcRequest::from(spec);
        let task_id = self.client.create_sddc(&request).await?;

        if !self.wait {
            info!("Creation accepted; not waiting for provisioning");
            return Ok(CreateOutcome::Accepted { task_id });
        }

        let mut backoff = Backoff::new(self.policy);
        let sddc_id = self.wait_until_located(&mut backoff).await?;
        wait_for_ready(&self.reporter, &sddc_id, &mut backoff).await?;

        let descriptor = self.reporter.describe(&sddc_id).await?;
        Ok(CreateOutcome::Created(descriptor))
    }

    /// Deletes the owner's SDDC, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if any API call fails, the delete request is
    /// rejected, deletion fails, or the wait times out.
    pub async fn delete(&self) -> Result<DeleteOutcome> {
        let Some(sddc_id) = self.locator.find_sddc_id(&self.owner).await? else {
            info!("Nothing to delete for {}", self.owner);
            return Ok(DeleteOutcome::NothingToDelete);
        };

        info!("Deleting SDDC {sddc_id}");
        let task_id = self.client.delete_sddc(&sddc_id).await?;

        if !self.wait {
            return Ok(DeleteOutcome::Accepted { sddc_id, task_id });
        }

        let mut backoff = Backoff::new(self.policy);
        wait_for_absence(&self.reporter, &sddc_id, &mut backoff).await?;
        Ok(DeleteOutcome::Deleted { sddc_id })
    }

    /// Describes the owner's SDDC without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if any API call fails or the response is incomplete.
    pub async fn describe_owned(&self) -> Result<Option<SddcDescriptor>> {
        match self.locator.find_sddc_id(&self.owner).await? {
            Some(sddc_id) => self.reporter.describe(&sddc_id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Re-queries the owner listing until the new SDDC shows up.
    async fn wait_until_located(&self, backoff: &mut Backoff) -> Result<String> {
        loop {
            if let Some(sddc_id) = self.locator.find_sddc_id(&self.owner).await? {
                return Ok(sddc_id);
            }
            warn!("New SDDC for {} is not listed yet", self.owner);
            backoff.wait(&self.owner, "listed").await?;
        }
    }
}

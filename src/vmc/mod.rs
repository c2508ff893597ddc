//! VMware Cloud API integration module.
//!
//! This module provides everything that talks to the provider: the CSP token
//! exchange, the SDDC endpoints, owner lookup, state reporting, polling and
//! the lifecycle orchestration built on top of them.

mod auth;
mod client;
mod types;
mod locator;
mod reporter;
mod poller;
mod orchestrator;

pub use auth::{CspAuthenticator, SessionToken};
pub use client::{VmcClient, first_error_message};
pub use types::{
    AccountLinkSddcConfig, Cluster, CreateSddcRequest, LifecycleState, ResourceConfig,
    SddcDetail, SddcSummary, TaskRef,
};
pub use locator::{SddcLocator, find_owned};
pub use reporter::{SddcDescriptor, StateReporter};
pub use poller::{Backoff, LifecyclePoller, PollPolicy, wait_for_absence, wait_for_ready};
pub use orchestrator::{CreateOutcome, DeleteOutcome, LifecycleOrchestrator};

//! VMC API client implementation.
//!
//! This module provides the HTTP client for the organization-scoped SDDC
//! endpoints of the VMC REST API.

use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, trace};

use crate::error::{ApiError, ProvisionError, Result, VmcError};

use super::auth::{CspAuthenticator, SessionToken};
use super::types::{CreateSddcRequest, SddcDetail, SddcSummary, TaskRef};

/// Header carrying the session token.
const AUTH_HEADER: &str = "csp-auth-token";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Key of the error array in create and read responses.
const CREATE_ERROR_KEY: &str = "error_messages";

/// Key of the error array in delete responses.
const DELETE_ERROR_KEY: &str = "error";

/// Longest raw body echoed back in an error.
const MAX_BODY_IN_ERROR: usize = 200;

/// VMC API client bound to one organization and session.
#[derive(Debug, Clone)]
pub struct VmcClient {
    /// HTTP client.
    client: Client,
    /// API base URL without trailing slash.
    api_url: String,
    /// Organization ID.
    org_id: String,
    /// Session token, shared by every clone of this client.
    token: Arc<RwLock<SessionToken>>,
    /// Source of fresh session tokens once the current one expires.
    refresher: Option<Arc<TokenRefresher>>,
}

/// Re-exchanges the refresh token when VMC rejects the session token.
struct TokenRefresher {
    authenticator: CspAuthenticator,
    refresh_token: String,
}

impl std::fmt::Debug for TokenRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRefresher")
            .field("authenticator", &self.authenticator)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

impl VmcClient {
    /// Creates a new VMC API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_url: &str, org_id: &str, token: SessionToken) -> Result<Self> {
        Self::with_timeout(api_url, org_id, token, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(
        api_url: &str,
        org_id: &str,
        token: SessionToken,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            org_id: org_id.to_string(),
            token: Arc::new(RwLock::new(token)),
            refresher: None,
        })
    }

    /// Renews the session token through `authenticator` whenever VMC answers
    /// 401, then retries the request once.
    ///
    /// CSP session tokens expire long before a provisioning wait does.
    #[must_use]
    pub fn with_token_refresh(
        mut self,
        authenticator: CspAuthenticator,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.refresher = Some(Arc::new(TokenRefresher {
            authenticator,
            refresh_token: refresh_token.into(),
        }));
        self
    }

    /// Returns the organization this client is bound to.
    #[must_use]
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// URL of the organization's SDDC collection.
    fn sddcs_url(&self) -> String {
        format!("{}/vmc/api/orgs/{}/sddcs", self.api_url, self.org_id)
    }

    /// URL of a single SDDC.
    fn sddc_url(&self, sddc_id: &str) -> String {
        format!("{}/{sddc_id}", self.sddcs_url())
    }

    /// Lists all SDDCs in the organization, in provider order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_sddcs(&self) -> Result<Vec<SddcSummary>> {
        let response = self.send(|c| c.get(self.sddcs_url())).await?;
        let sddcs: Vec<SddcSummary> = Self::read_json(response, None).await?;

        debug!("Organization {} has {} SDDCs", self.org_id, sddcs.len());
        Ok(sddcs)
    }

    /// Gets an SDDC by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SddcNotFound`] on HTTP 404, or another error if the
    /// API call fails.
    pub async fn get_sddc(&self, sddc_id: &str) -> Result<SddcDetail> {
        let response = self.send(|c| c.get(self.sddc_url(sddc_id))).await?;
        Self::read_json(response, Some(sddc_id)).await
    }

    /// Requests creation of a new SDDC.
    ///
    /// Returns the provisioning task ID when the provider reports one.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Rejected`] unless the provider answers 202.
    pub async fn create_sddc(&self, request: &CreateSddcRequest) -> Result<Option<String>> {
        debug!("Requesting SDDC {} with {} hosts", request.name, request.num_hosts);
        let response = self
            .send(|c| c.post(self.sddcs_url()).json(request))
            .await?;

        Self::read_accepted(response, "create", CREATE_ERROR_KEY).await
    }

    /// Requests deletion of an SDDC.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Rejected`] unless the provider answers 202.
    pub async fn delete_sddc(&self, sddc_id: &str) -> Result<Option<String>> {
        let response = self.send(|c| c.delete(self.sddc_url(sddc_id))).await?;
        Self::read_accepted(response, "delete", DELETE_ERROR_KEY).await
    }

    /// Sends a request with the session header attached.
    ///
    /// A 401 triggers one token renewal and one retry when a refresher is
    /// configured; otherwise the 401 response is returned as is.
    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = self.send_once(&build).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(refresher) = &self.refresher else {
            return Ok(response);
        };

        info!("Session token rejected; exchanging refresh token again");
        let renewed = refresher
            .authenticator
            .authenticate(&refresher.refresh_token)
            .await?;
        *self.token.write().await = renewed;

        self.send_once(&build).await
    }

    async fn send_once<F>(&self, build: &F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self.token.read().await.clone();
        let response = build(&self.client)
            .header(AUTH_HEADER, token.as_str())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        trace!("{} {}", response.status(), response.url());
        Ok(response)
    }

    /// Decodes a read-call response, mapping failures onto [`ApiError`].
    async fn read_json<T: DeserializeOwned>(response: Response, sddc_id: Option<&str>) -> Result<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            }
            .into());
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = sddc_id {
                return Err(ApiError::SddcNotFound {
                    sddc_id: id.to_string(),
                }
                .into());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = first_error_message(&body, CREATE_ERROR_KEY)
                .unwrap_or_else(|| truncate(&body, MAX_BODY_IN_ERROR));
            return Err(ApiError::request_failed(status.as_u16(), message).into());
        }

        serde_json::from_str(&body).map_err(|e| {
            VmcError::Api(ApiError::InvalidResponse {
                message: format!("Failed to parse response: {e}"),
            })
        })
    }

    /// Checks a mutating call for HTTP 202 and extracts the task ID.
    async fn read_accepted(
        response: Response,
        operation: &str,
        error_key: &str,
    ) -> Result<Option<String>> {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Could not read {operation} response body: {e}");
                String::new()
            }
        };

        if status != StatusCode::ACCEPTED {
            let message = first_error_message(&body, error_key);
            return Err(ProvisionError::rejected(operation, status.as_u16(), message).into());
        }

        let task_id = serde_json::from_str::<TaskRef>(&body)
            .ok()
            .and_then(|task| task.id);
        if let Some(id) = &task_id {
            debug!("{operation} accepted as task {id}");
        }

        Ok(task_id)
    }
}

/// Extracts the first error message stored under `key` in a JSON body.
///
/// The value may be an array (first element wins) or a single string.
/// Returns `None` for non-JSON bodies, a missing key, or an empty value.
#[must_use]
pub fn first_error_message(body: &str, key: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let entry = match value.get(key)? {
        serde_json::Value::Array(items) => items.first()?.clone(),
        other => other.clone(),
    };

    let message = match entry {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => return None,
        other => other.to_string(),
    };

    (!message.is_empty()).then_some(message)
}

/// Truncates a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_len).collect();
        out.push_str("...");
        out
    }
}

//! CSP refresh-token exchange.
//!
//! Every VMC call is authorized with a short-lived access token obtained by
//! trading the operator's long-lived refresh token at the CSP identity
//! provider. The token is never revoked; it simply expires.

use reqwest::{Client, header};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AuthError, Result};

use super::client::first_error_message;

/// Token exchange path on the CSP identity provider.
const AUTHORIZE_PATH: &str = "/csp/gateway/am/api/auth/api-tokens/authorize";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Short-lived bearer token presented on every VMC call.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw access token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges refresh tokens for session tokens.
#[derive(Debug, Clone)]
pub struct CspAuthenticator {
    /// HTTP client.
    client: Client,
    /// CSP base URL without trailing slash.
    csp_url: String,
}

impl CspAuthenticator {
    /// Creates a new authenticator for the given CSP base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(csp_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthError::RequestFailed {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            csp_url: csp_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchanges a refresh token for a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the request fails, the provider rejects the
    /// token, or the response has no access token.
    pub async fn authenticate(&self, refresh_token: &str) -> Result<SessionToken> {
        let url = format!("{}{AUTHORIZE_PATH}", self.csp_url);
        info!("Exchanging refresh token at {}", self.csp_url);

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .query(&[("refresh_token", refresh_token)])
            .send()
            .await
            .map_err(|e| AuthError::RequestFailed {
                message: format!("Request failed: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AuthError::RequestFailed {
            message: format!("Failed to read response: {e}"),
        })?;

        if !status.is_success() {
            let message = first_error_message(&body, "message")
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let parsed = serde_json::from_str::<TokenResponse>(&body).ok();
        let expires_in = parsed.as_ref().and_then(|r| r.expires_in);
        let token = parsed
            .and_then(|r| r.access_token)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingAccessToken)?;

        match expires_in {
            Some(secs) => debug!("Obtained session token valid for {secs}s"),
            None => debug!("Obtained session token"),
        }
        Ok(SessionToken::new(token))
    }
}

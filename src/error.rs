//! Error types for the SDDC lifecycle tool.
//!
//! This module provides the error hierarchy for every step of an invocation:
//! configuration, token exchange, read calls against the VMC API,
//! provisioning requests, and the poll loop that waits on them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the SDDC lifecycle tool.
#[derive(Debug, Error)]
pub enum VmcError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Token exchange errors.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Read-call errors against the VMC API.
    #[error("VMC API error: {0}")]
    Api(#[from] ApiError),

    /// Create or delete request errors.
    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    /// A response was missing a field the descriptor needs.
    #[error("SDDC {sddc_id} response is missing {field}")]
    MissingData {
        /// ID of the SDDC being described.
        sddc_id: String,
        /// Path of the missing field.
        field: String,
    },

    /// The poll loop ran out of time.
    #[error("Timed out after {waited_secs}s waiting for {target} to become {expected_state}")]
    Timeout {
        /// What was being waited on (owner name or SDDC ID).
        target: String,
        /// State that was not reached.
        expected_state: String,
        /// Seconds spent waiting.
        waited_secs: u64,
    },

    /// The invocation was interrupted by the operator.
    #[error("Interrupted before the operation completed")]
    Interrupted,

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Errors from the CSP refresh-token exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token request never got a response.
    #[error("Token request failed: {message}")]
    RequestFailed {
        /// Description of the transport failure.
        message: String,
    },

    /// The identity provider refused the refresh token.
    #[error("Token exchange rejected: {status} - {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the identity provider.
        message: String,
    },

    /// The response carried no access token.
    #[error("Token response did not contain an access token")]
    MissingAccessToken,
}

/// Errors from read calls against the VMC API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure.
    #[error("Network error communicating with VMC: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// The session token was refused (expired or lacking rights).
    #[error("VMC rejected the session token (HTTP {status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// The SDDC does not exist.
    #[error("SDDC not found: {sddc_id}")]
    SddcNotFound {
        /// ID that was looked up.
        sddc_id: String,
    },

    /// Any other non-success status.
    #[error("VMC API request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// First error message from the body, or the raw body.
        message: String,
    },

    /// The body could not be decoded.
    #[error("Invalid response from VMC API: {message}")]
    InvalidResponse {
        /// Description of the decoding issue.
        message: String,
    },
}

/// Errors from mutating calls and the resources they produce.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A create or delete request was not accepted with HTTP 202.
    #[error("{operation} request rejected (HTTP {status}): {message}")]
    Rejected {
        /// Operation that was attempted.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// First provider-supplied error message.
        message: String,
    },

    /// The SDDC reached a terminal state other than the one requested.
    #[error("SDDC {sddc_id} ended in state {state}")]
    Failed {
        /// ID of the SDDC.
        sddc_id: String,
        /// Terminal state observed.
        state: String,
    },
}

/// Result type alias for SDDC lifecycle operations.
pub type Result<T> = std::result::Result<T, VmcError>;

/// Fallback text when the provider returns no error message.
const NO_PROVIDER_MESSAGE: &str = "provider returned no error message";

impl VmcError {
    /// Creates a missing-data error for a descriptor field.
    #[must_use]
    pub fn missing(sddc_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingData {
            sddc_id: sddc_id.into(),
            field: field.into(),
        }
    }

    /// Returns true if this error means the SDDC does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(ApiError::SddcNotFound { .. }))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ApiError {
    /// Creates an API request error.
    #[must_use]
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

impl ProvisionError {
    /// Creates a rejection error, falling back to a generic message.
    #[must_use]
    pub fn rejected(operation: impl Into<String>, status: u16, message: Option<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            status,
            message: message.unwrap_or_else(|| String::from(NO_PROVIDER_MESSAGE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_falls_back_to_generic_message() {
        let err = ProvisionError::rejected("create", 400, None);
        assert_eq!(
            err.to_string(),
            "create request rejected (HTTP 400): provider returned no error message"
        );
    }

    #[test]
    fn test_not_found_detection() {
        let err = VmcError::Api(ApiError::SddcNotFound {
            sddc_id: String::from("abc"),
        });
        assert!(err.is_not_found());
        assert!(!VmcError::Interrupted.is_not_found());
    }
}

//! Configuration validation.
//!
//! This module checks a loaded configuration before any network call is made,
//! so that a bad URL or CIDR fails fast instead of after the token exchange.

use crate::error::{ConfigError, Result, VmcError};
use reqwest::Url;
use std::net::Ipv4Addr;
use tracing::debug;

use super::spec::{PollConfig, SddcSpec, VmcConfig, VmcSection};

/// Largest host count accepted for a single-cluster SDDC.
const MAX_HOSTS: u32 = 16;

/// Longest delay accepted between two polls.
const MAX_POLL_INTERVAL_SECS: u64 = 3600;

/// Validator for tool configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a configuration.
    ///
    /// Returns the full result (including warnings) when there are no errors.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any check fails.
    pub fn validate(&self, config: &VmcConfig) -> Result<ValidationResult> {
        let result = self.check(config);

        if let Some(first_error) = result.errors.first() {
            return Err(VmcError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )));
        }

        debug!("Configuration validation passed");
        Ok(result)
    }

    /// Runs every check and collects all findings.
    #[must_use]
    pub fn check(&self, config: &VmcConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_vmc(&config.vmc, &mut result);
        Self::validate_sddc(&config.sddc, &mut result);
        Self::validate_poll(&config.poll, &mut result);

        result
    }

    fn validate_vmc(vmc: &VmcSection, result: &mut ValidationResult) {
        for (field, value) in [("vmc.api_url", &vmc.api_url), ("vmc.csp_url", &vmc.csp_url)] {
            if !is_http_url(value) {
                result.error(field, format!("'{value}' is not an http(s) URL"));
            }
        }

        require(result, "vmc.refresh_token", &vmc.refresh_token);
        require(result, "vmc.org_id", &vmc.org_id);
        require(result, "vmc.user_name", &vmc.user_name);

        if !vmc.refresh_token.is_empty() && std::env::var("VMC_REFRESH_TOKEN").is_err() {
            result.warnings.push(String::from(
                "Refresh token is stored in the configuration file; prefer VMC_REFRESH_TOKEN",
            ));
        }
    }

    fn validate_sddc(sddc: &SddcSpec, result: &mut ValidationResult) {
        require(result, "sddc.name", &sddc.name);
        require(result, "sddc.provider", &sddc.provider);
        require(result, "sddc.region", &sddc.region);
        require(result, "sddc.subnet_id", &sddc.subnet_id);
        require(result, "sddc.connected_account_id", &sddc.connected_account_id);
        require(result, "sddc.deployment_type", &sddc.deployment_type);

        if sddc.num_hosts == 0 || sddc.num_hosts > MAX_HOSTS {
            result.error(
                "sddc.num_hosts",
                format!("Host count must be between 1 and {MAX_HOSTS}, got {}", sddc.num_hosts),
            );
        }

        if !is_ipv4_cidr(&sddc.vxlan_subnet) {
            result.error(
                "sddc.vxlan_subnet",
                format!("'{}' is not an IPv4 CIDR block", sddc.vxlan_subnet),
            );
        }
    }

    fn validate_poll(poll: &PollConfig, result: &mut ValidationResult) {
        if poll.initial_interval_secs == 0 {
            result.error("poll.initial_interval_secs", "Poll interval must be positive");
        }
        if poll.max_interval_secs > MAX_POLL_INTERVAL_SECS {
            result.error(
                "poll.max_interval_secs",
                format!("Maximum poll interval must not exceed {MAX_POLL_INTERVAL_SECS}s"),
            );
        }
        if poll.max_interval_secs < poll.initial_interval_secs {
            result.error(
                "poll.max_interval_secs",
                "Maximum poll interval must not be below the initial interval",
            );
        }
        if !(poll.multiplier >= 1.0 && poll.multiplier.is_finite()) {
            result.error("poll.multiplier", "Backoff multiplier must be at least 1.0");
        }
        if poll.timeout_secs == 0 {
            result.error("poll.timeout_secs", "Poll timeout must be positive");
        }
    }
}

/// Records an error when a required string is blank.
fn require(result: &mut ValidationResult, field: &str, value: &str) {
    if value.trim().is_empty() {
        result.error(field, format!("{field} cannot be empty"));
    }
}

/// Checks that a string is an absolute http or https URL.
fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

/// Checks that a string is an IPv4 CIDR block such as `10.2.0.0/16`.
fn is_ipv4_cidr(value: &str) -> bool {
    let Some((addr, prefix)) = value.split_once('/') else {
        return false;
    };

    addr.parse::<Ipv4Addr>().is_ok() && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
}

impl ValidationResult {
    /// Records an error for a field.
    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

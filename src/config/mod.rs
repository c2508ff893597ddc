//! Configuration module for the SDDC lifecycle tool.
//!
//! This module handles all configuration-related functionality:
//! - Locating and deserializing the YAML configuration file
//! - Environment and `.env` overrides for credentials
//! - Validation of configuration values

mod spec;
mod parser;
mod validator;

pub use spec::{PollConfig, SddcSpec, VmcConfig, VmcSection};
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};

//! Configuration parser for loading configuration files.
//!
//! This module handles loading configuration from YAML files, the optional
//! `.env` file next to it, and `VMC_*` environment variable overrides.

use crate::error::{ConfigError, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::VmcConfig;

/// Environment variables that override fields of the `vmc` section.
const ENV_API_URL: &str = "VMC_API_URL";
const ENV_CSP_URL: &str = "VMC_CSP_URL";
const ENV_REFRESH_TOKEN: &str = "VMC_REFRESH_TOKEN";
const ENV_ORG_ID: &str = "VMC_ORG_ID";
const ENV_USER_NAME: &str = "VMC_USER_NAME";

/// Configuration parser for loading the tool configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving the `.env` file.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<VmcConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            },
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<VmcConfig> {
        debug!("Parsing YAML configuration");

        let config: VmcConfig = serde_yaml::from_str(content).map_err(|e| {
            let file = source.map_or_else(|| String::from("<inline>"), |p| p.display().to_string());
            let location = e.location().map_or(file.clone(), |at| {
                format!("{file}:{}:{}", at.line(), at.column())
            });
            ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: Some(location),
            }
        })?;

        debug!(
            "Parsed configuration for org {} (owner {})",
            config.vmc.org_id, config.vmc.user_name
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<VmcConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// Applies `VMC_*` overrides using the given variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(config: &mut VmcConfig, lookup: impl Fn(&str) -> Option<String>) {
        let vmc = &mut config.vmc;
        let targets: [(&str, &mut String); 5] = [
            (ENV_API_URL, &mut vmc.api_url),
            (ENV_CSP_URL, &mut vmc.csp_url),
            (ENV_REFRESH_TOKEN, &mut vmc.refresh_token),
            (ENV_ORG_ID, &mut vmc.org_id),
            (ENV_USER_NAME, &mut vmc.user_name),
        ];

        for (name, field) in targets {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                debug!("Overriding {name} from environment");
                *field = value;
            }
        }
    }

    /// Loads the `.env` file next to the configuration, if there is one.
    ///
    /// Variables already set in the environment are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the `.env` file exists but cannot be parsed.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
            .join(".env");

        match dotenvy::from_path(&env_path) {
            Ok(()) => {
                info!("Loaded environment from: {}", env_path.display());
                Ok(())
            }
            Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No .env file at: {}", env_path.display());
                Ok(())
            }
            Err(e) => Err(ConfigError::ParseError {
                message: format!("Failed to load .env file: {e}"),
                location: Some(env_path.display().to_string()),
            }
            .into()),
        }
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["vmc-sddc.yaml", "vmc-sddc.yml", "sddc.yaml"];

/// Finds the configuration file.
///
/// Each of `start_dir` and its ancestors is searched for
/// [`DEFAULT_CONFIG_FILES`] in order, nearest directory first. The user
/// configuration file `<config dir>/vmc-sddc/config.yaml` is the last resort.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let base = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    let found = base
        .ancestors()
        .flat_map(|dir| DEFAULT_CONFIG_FILES.iter().map(move |name| dir.join(name)))
        .chain(user_config_file())
        .find(|candidate| candidate.is_file());

    match found {
        Some(path) => {
            info!("Found configuration file: {}", path.display());
            Ok(path)
        }
        None => Err(ConfigError::FileNotFound {
            path: start.join(DEFAULT_CONFIG_FILES[0]),
        }
        .into()),
    }
}

/// Per-user configuration file location.
fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vmc-sddc").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VmcError;
    use tempfile::TempDir;

    const MINIMAL: &str = r"
vmc:
  org_id: org-1
  user_name: alice@example.com
sddc:
  name: lab
  region: US_WEST_2
  subnet_id: subnet-0a1b
  connected_account_id: acct-9
  vxlan_subnet: 10.2.0.0/16
";

    #[test]
    fn test_parse_minimal_config() {
        let parser = ConfigParser::new();
        let config = parser.parse_yaml(MINIMAL, None).expect("minimal config parses");

        assert_eq!(config.vmc.org_id, "org-1");
        assert_eq!(config.vmc.api_url, "https://vmc.vmware.com");
        assert_eq!(config.vmc.csp_url, "https://console.cloud.vmware.com");
        assert!(config.vmc.refresh_token.is_empty());
        assert_eq!(config.sddc.num_hosts, 1);
        assert_eq!(config.sddc.provider, "AWS");
        assert_eq!(config.sddc.deployment_type, "SingleAZ");
        assert_eq!(config.poll.timeout_secs, 7200);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
vmc:
  api_url: https://vmc.example.test
  csp_url: https://csp.example.test
  refresh_token: rt-123
  org_id: org-1
  user_name: alice@example.com
sddc:
  name: lab
  num_hosts: 3
  provider: AWS
  region: EU_CENTRAL_1
  subnet_id: subnet-0a1b
  connected_account_id: acct-9
  deployment_type: MultiAZ
  vxlan_subnet: 10.2.0.0/16
  sddc_type: "1NODE"
poll:
  initial_interval_secs: 5
  max_interval_secs: 30
  multiplier: 1.5
  timeout_secs: 600
"#;
        let config = ConfigParser::new()
            .parse_yaml(yaml, None)
            .expect("full config parses");

        assert_eq!(config.vmc.refresh_token, "rt-123");
        assert_eq!(config.sddc.num_hosts, 3);
        assert_eq!(config.sddc.deployment_type, "MultiAZ");
        assert_eq!(config.sddc.sddc_type, "1NODE");
        assert_eq!(config.poll.initial_interval_secs, 5);
        assert!((config.poll.multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_missing_section() {
        let result = ConfigParser::new().parse_yaml("vmc:\n  org_id: x\n", None);
        assert!(matches!(
            result,
            Err(VmcError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_env_overrides_skip_empty_values() {
        let mut config = ConfigParser::new()
            .parse_yaml(MINIMAL, None)
            .expect("minimal config parses");

        ConfigParser::apply_overrides(&mut config, |name| match name {
            "VMC_REFRESH_TOKEN" => Some(String::from("from-env")),
            "VMC_ORG_ID" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.vmc.refresh_token, "from-env");
        assert_eq!(config.vmc.org_id, "org-1");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let result = ConfigParser::new().load_file(temp.path().join("nope.yaml"));
        assert!(matches!(
            result,
            Err(VmcError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_find_config_in_parent_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).expect("Failed to create nested dir");
        std::fs::write(temp.path().join("vmc-sddc.yaml"), MINIMAL).expect("Failed to write config");

        let root = temp.path().canonicalize().expect("Failed to resolve temp dir");
        let found = find_config_file(&nested).expect("config should be found");
        assert_eq!(found, root.join("vmc-sddc.yaml"));

        let config = ConfigParser::new().load_file(&found).expect("config loads");
        assert_eq!(config.sddc.name, "lab");
    }

    #[test]
    fn test_nearest_config_wins() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let nested = temp.path().join("project");
        std::fs::create_dir_all(&nested).expect("Failed to create nested dir");
        std::fs::write(temp.path().join("vmc-sddc.yaml"), MINIMAL).expect("Failed to write config");
        std::fs::write(nested.join("sddc.yaml"), MINIMAL).expect("Failed to write config");

        let found = find_config_file(&nested).expect("config should be found");
        assert_eq!(found.file_name().and_then(|n| n.to_str()), Some("sddc.yaml"));
    }

    #[test]
    fn test_parse_error_reports_position() {
        let result =
            ConfigParser::new().parse_yaml("vmc: [unclosed\n", Some(Path::new("bad.yaml")));

        match result {
            Err(VmcError::Config(ConfigError::ParseError { location, .. })) => {
                let location = location.expect("location is reported");
                assert!(location.starts_with("bad.yaml:"), "unexpected location {location}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_dotenv_is_optional_and_loaded_when_present() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let parser = ConfigParser::new().with_base_path(temp.path());
        parser.load_dotenv().expect("missing .env is fine");

        std::fs::write(temp.path().join(".env"), "VMC_SDDC_DOTENV_MARKER=loaded\n")
            .expect("Failed to write .env");
        parser.load_dotenv().expect(".env loads");
        assert_eq!(
            std::env::var("VMC_SDDC_DOTENV_MARKER").as_deref(),
            Ok("loaded")
        );
    }
}

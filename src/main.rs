//! vmc-sddc CLI entrypoint.
//!
//! This is the main entrypoint for the vmc-sddc command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use vmc_sddc::cli::{Action, Cli, OutputFormatter};
use vmc_sddc::config::{ConfigParser, ConfigValidator, VmcConfig, find_config_file};
use vmc_sddc::error::{Result, VmcError};
use vmc_sddc::vmc::{CspAuthenticator, LifecycleOrchestrator, PollPolicy, VmcClient};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(async {
        tokio::select! {
            result = run(cli) => result,
            _ = tokio::signal::ctrl_c() => Err(VmcError::Interrupted),
        }
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr so stdout carries only the command result.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let config = load_config(cli.config.as_ref())?;

    let mut policy = PollPolicy::from(&config.poll);
    if let Some(secs) = cli.timeout {
        policy = policy.with_timeout(Duration::from_secs(secs));
    }

    let authenticator = CspAuthenticator::new(&config.vmc.csp_url)?;
    let token = authenticator.authenticate(&config.vmc.refresh_token).await?;
    info!("Authenticated against {}", config.vmc.csp_url);

    let client = VmcClient::new(&config.vmc.api_url, &config.vmc.org_id, token)?
        .with_token_refresh(authenticator, config.vmc.refresh_token.clone());
    debug!("Using organization {}", client.org_id());

    let orchestrator = LifecycleOrchestrator::new(client, config.vmc.user_name.clone())
        .with_poll_policy(policy)
        .with_wait(!cli.no_wait);

    let rendered = match cli.action() {
        Action::EnsureCreated => {
            let outcome = orchestrator.ensure_created(&config.sddc).await?;
            formatter.format_create(&outcome)
        }
        Action::Delete => {
            let outcome = orchestrator.delete().await?;
            formatter.format_delete(&outcome)
        }
        Action::Describe => {
            let descriptor = orchestrator.describe_owned().await?;
            formatter.format_describe(descriptor.as_ref(), &config.vmc.user_name)
        }
    };

    OutputFormatter::emit(&rendered)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads, overrides and validates the configuration.
fn load_config(config_path: Option<&PathBuf>) -> Result<VmcConfig> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser =
        ConfigParser::new().with_base_path(config_file.parent().unwrap_or_else(|| Path::new(".")));
    parser.load_dotenv()?;

    let config = parser.load_with_env(&config_file)?;

    let result = ConfigValidator::new().validate(&config)?;
    for warning in &result.warnings {
        warn!("{warning}");
    }

    Ok(config)
}

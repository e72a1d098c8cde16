//! `cloudline check` - validate the deployment environment
//!
//! Resolves the configuration the same way `deploy` would and probes the
//! `cf` CLI, without touching the remote environment or the build. Use
//! it to find configuration problems before a deployment.

use crate::executor::{CommandRunner, Invocation, ProcessRunner, RunnerConfig};
use crate::infrastructure::{ProjectSettings, SETTINGS_FILE};
use crate::pipeline::steps::CF;
use crate::pipeline::DeployConfig;
use anyhow::Result;
use std::path::Path;

/// Validates the project settings and the local tooling
///
/// # Errors
///
/// Fails when the settings cannot be loaded, the resolved configuration
/// is invalid, or the `cf` CLI is unavailable.
pub fn check_environment(project_dir: &Path) -> Result<()> {
    let settings = ProjectSettings::load_or_default(&project_dir.join(SETTINGS_FILE))?;

    let name = settings
        .name
        .clone()
        .unwrap_or_else(|| "unnamed".to_string());
    let config = DeployConfig::resolve(
        &name,
        settings.profile,
        settings.dev_database,
        settings.database,
        settings.build_override.as_deref(),
    )?;

    tracing::info!(app = %config.app_name, profile = %config.profile, "Configuration is valid");

    if !is_cf_available(project_dir) {
        anyhow::bail!(
            "The cf command line interface is not available. \
             You can install it via https://github.com/cloudfoundry/cli/releases"
        );
    }

    println!("Environment looks good; '{}' is ready to deploy.", config.app_name);
    Ok(())
}

/// Probes the `cf` CLI with a version query
#[must_use]
pub fn is_cf_available(project_dir: &Path) -> bool {
    let runner = ProcessRunner::with_config(RunnerConfig {
        cwd: project_dir.to_path_buf(),
        streaming: false,
        ..RunnerConfig::default()
    });

    match runner.run(&Invocation::new(CF, &["-v"])) {
        Ok(result) if result.is_success() => {
            tracing::info!(version = %result.stdout.trim(), "cf available");
            true
        }
        Ok(result) => {
            tracing::warn!(exit_code = result.exit_code, "cf probe returned an error");
            false
        }
        Err(err) => {
            tracing::warn!(error = %err, "cf not found");
            false
        }
    }
}

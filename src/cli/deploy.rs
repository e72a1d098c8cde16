//! `cloudline deploy` - run the deployment pipeline
//!
//! Loads the project settings, resolves the deployment configuration,
//! writes the deployment files, and drives the pipeline against the real
//! command runner. The report is printed as text or JSON.

use crate::executor::{ProcessRunner, RunnerConfig};
use crate::infrastructure::{emit_deployment_files, ProjectSettings, SETTINGS_FILE};
use crate::pipeline::{deploy_pipeline_in, DeployConfig, PipelineReport, Profile};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// How the run report is printed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable step trace
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Options for one deploy invocation
#[derive(Debug, Default)]
pub struct DeployOptions {
    /// Project directory (defaults to the current directory)
    pub project_dir: PathBuf,

    /// Settings file override
    pub settings_file: Option<PathBuf>,

    /// Deployed-name override
    pub name: Option<String>,

    /// Profile override
    pub profile: Option<Profile>,

    /// Report format
    pub format: ReportFormat,
}

/// Runs the full deployment pipeline
///
/// # Errors
///
/// Fails when the configuration cannot be resolved, the deployment files
/// cannot be written, or the pipeline ends aborted.
pub fn deploy(options: &DeployOptions) -> Result<PipelineReport> {
    let config = resolve_config(options)?;

    tracing::info!(app = %config.app_name, "Cloud Foundry configuration resolved");

    emit_deployment_files(&config, &options.project_dir)
        .context("Failed to create the Cloud Foundry deployment files")?;

    let runner = ProcessRunner::with_config(RunnerConfig {
        cwd: options.project_dir.clone(),
        ..RunnerConfig::default()
    });

    let mut engine = deploy_pipeline_in(options.project_dir.join("target"));
    let report = engine.run(&config, &runner);

    print_report(&report, options.format)?;

    if !report.terminal.is_completed() {
        anyhow::bail!("Deployment of '{}' aborted", report.app_name);
    }

    Ok(report)
}

/// Merges the settings file with command-line overrides
fn resolve_config(options: &DeployOptions) -> Result<DeployConfig> {
    let settings_path = options
        .settings_file
        .clone()
        .unwrap_or_else(|| options.project_dir.join(SETTINGS_FILE));
    let settings = ProjectSettings::load_or_default(&settings_path)?;

    let name = options
        .name
        .clone()
        .or(settings.name)
        .or_else(|| directory_name(&options.project_dir))
        .context("No deployed name configured and none could be derived")?;

    let profile = options.profile.unwrap_or(settings.profile);

    let config = DeployConfig::resolve(
        &name,
        profile,
        settings.dev_database,
        settings.database,
        settings.build_override.as_deref(),
    )?;

    Ok(config)
}

fn directory_name(dir: &Path) -> Option<String> {
    dir.canonicalize()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn print_report(report: &PipelineReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => {
            println!();
            for record in &report.steps {
                println!("  {:<20} {}", record.step, record.status);
            }
            println!(
                "\n{} ({} profile): {}",
                report.app_name, report.profile, report.terminal
            );
        }
        ReportFormat::Json => {
            let rendered = serde_json::to_string_pretty(report)
                .context("Failed to render the run report")?;
            println!("{rendered}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_prefers_flag_over_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "name: fromfile\n").unwrap();

        let options = DeployOptions {
            project_dir: dir.path().to_path_buf(),
            name: Some("fromflag".to_string()),
            ..DeployOptions::default()
        };

        let config = resolve_config(&options).unwrap();
        assert_eq!(config.app_name, "fromflag");
    }

    #[test]
    fn test_resolve_config_falls_back_to_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("My-Project");
        std::fs::create_dir(&project).unwrap();

        let options = DeployOptions {
            project_dir: project,
            ..DeployOptions::default()
        };

        let config = resolve_config(&options).unwrap();
        assert_eq!(config.app_name, "myproject");
    }

    #[test]
    fn test_resolve_config_applies_profile_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "name: myapp\nprofile: dev\n").unwrap();

        let options = DeployOptions {
            project_dir: dir.path().to_path_buf(),
            profile: Some(Profile::Prod),
            ..DeployOptions::default()
        };

        let config = resolve_config(&options).unwrap();
        assert_eq!(config.profile, Profile::Prod);
    }
}

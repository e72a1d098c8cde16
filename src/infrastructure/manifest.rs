//! Deployment file emission
//!
//! Writes the files the push command consumes: the Cloud Foundry
//! manifest under `deploy/cloudfoundry/` and the platform-specific
//! Spring configuration under the application's resource directory.
//! Both are produced from [`DeployConfig`] by typed serialization —
//! there is no template engine here.

use crate::pipeline::config::DeployConfig;
use crate::pipeline::errors::PipelineError;
use crate::pipeline::steps::MANIFEST_PATH;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Where the platform-specific Spring configuration is written
pub const PLATFORM_CONFIG_PATH: &str = "src/main/resources/config/application-cloudfoundry.yml";

#[derive(Debug, Serialize)]
struct Manifest {
    applications: Vec<ManifestApp>,
}

#[derive(Debug, Serialize)]
struct ManifestApp {
    name: String,
    memory: String,
    instances: u32,
    env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    services: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PlatformConfig {
    spring: SpringSection,
    server: ServerSection,
}

#[derive(Debug, Serialize)]
struct SpringSection {
    application: SpringApplication,
}

#[derive(Debug, Serialize)]
struct SpringApplication {
    name: String,
}

#[derive(Debug, Serialize)]
struct ServerSection {
    port: String,
}

/// Writes the deployment manifest and platform configuration
///
/// Both paths are relative to `root`, which is the project directory the
/// pipeline will run in. Existing files are overwritten; a re-run always
/// reflects the current configuration.
///
/// # Errors
///
/// Returns [`PipelineError`] when a directory or file cannot be written.
pub fn emit_deployment_files(config: &DeployConfig, root: &Path) -> Result<(), PipelineError> {
    write_yaml(&root.join(MANIFEST_PATH), &manifest_for(config))?;
    write_yaml(&root.join(PLATFORM_CONFIG_PATH), &platform_config_for(config))?;
    Ok(())
}

fn manifest_for(config: &DeployConfig) -> Manifest {
    let mut env = BTreeMap::new();
    env.insert(
        "SPRING_PROFILES_ACTIVE".to_string(),
        format!("cloudfoundry,{}", config.profile),
    );

    // A bound service instance carries the deployed name; the platform
    // wires its credentials into the app environment.
    let services = if config.database.is_some() {
        vec![config.app_name.clone()]
    } else {
        Vec::new()
    };

    Manifest {
        applications: vec![ManifestApp {
            name: config.app_name.clone(),
            memory: "1G".to_string(),
            instances: 1,
            env,
            services,
        }],
    }
}

fn platform_config_for(config: &DeployConfig) -> PlatformConfig {
    PlatformConfig {
        spring: SpringSection {
            application: SpringApplication {
                name: config.app_name.clone(),
            },
        },
        server: ServerSection {
            port: "${PORT:8080}".to_string(),
        },
    }
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| PipelineError::Emit {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let rendered =
        serde_yaml::to_string(value).map_err(|err| PipelineError::Io(err.to_string()))?;

    std::fs::write(path, rendered).map_err(|source| PipelineError::Emit {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "Wrote deployment file");
    Ok(())
}

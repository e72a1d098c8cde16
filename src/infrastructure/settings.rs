//! Project settings file
//!
//! Persisted answers for a project, read from `cloudline.yml` in the
//! project directory. The CLI merges these with command-line overrides
//! and hands the result to [`DeployConfig::resolve`]; interactive
//! collection of the answers is out of scope for this tool.
//!
//! [`DeployConfig::resolve`]: crate::pipeline::DeployConfig::resolve

use crate::pipeline::config::{DatabaseService, DevDatabase, Profile};
use crate::pipeline::errors::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default settings file name, relative to the project directory
pub const SETTINGS_FILE: &str = "cloudline.yml";

/// Persisted project settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectSettings {
    /// Name to deploy as; defaults to the project directory name
    #[serde(default)]
    pub name: Option<String>,

    /// Build profile
    #[serde(default)]
    pub profile: Profile,

    /// Database the project uses during development
    #[serde(default)]
    pub dev_database: DevDatabase,

    /// Managed database service to provision, if any
    #[serde(default)]
    pub database: Option<DatabaseService>,

    /// Replacement build command
    #[serde(default)]
    pub build_override: Option<String>,
}

impl ProjectSettings {
    /// Loads settings from a YAML file
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Settings`] when the file cannot be read
    /// or parsed.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|err| PipelineError::Settings {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

        serde_yaml::from_str(&raw).map_err(|err| PipelineError::Settings {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    /// Loads settings, falling back to defaults when the file is absent
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Settings`] when the file exists but
    /// cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, PipelineError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No settings file; using defaults");
            Ok(Self::default())
        }
    }
}

//! Deployment configuration
//!
//! [`DeployConfig`] is the immutable input of a pipeline run. It is
//! resolved once, up front, from the project settings; every step reads
//! it by shared reference and nothing mutates it afterwards.

#![allow(clippy::must_use_candidate)]

use crate::pipeline::errors::ValidationError;
use crate::pipeline::types::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a deployed application name
const MAX_NAME_LEN: usize = 63;

/// Build profile used for the artifact and the remote environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Development profile
    #[default]
    Dev,
    /// Production profile
    Prod,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

/// Database the generated project uses during development
///
/// Embedded variants live inside the application process and cannot back
/// a remote dev deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DevDatabase {
    /// Embedded database persisted to local disk
    EmbeddedDisk,
    /// Embedded in-memory database
    EmbeddedMemory,
    /// External database server
    #[default]
    External,
}

impl DevDatabase {
    /// Returns true for databases that run inside the application process
    pub fn is_embedded(self) -> bool {
        matches!(self, Self::EmbeddedDisk | Self::EmbeddedMemory)
    }
}

/// Managed database service to provision on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseService {
    /// Marketplace service name (e.g. "elephantsql")
    pub service: String,

    /// Service plan (e.g. "turtle")
    pub plan: String,
}

impl Validate for DatabaseService {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.service.trim().is_empty() {
            return Err(ValidationError::EmptyService);
        }
        if self.plan.trim().is_empty() {
            return Err(ValidationError::EmptyPlan);
        }
        Ok(())
    }
}

/// Immutable configuration for one deployment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployConfig {
    /// Deployed application name, slug-normalized with hyphens removed
    pub app_name: String,

    /// Resolved build profile
    pub profile: Profile,

    /// Managed database service, when the project has a database
    pub database: Option<DatabaseService>,

    /// Replacement build command, split into an argument vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_override: Option<Vec<String>>,
}

impl DeployConfig {
    /// Resolves the configuration for a run
    ///
    /// Normalizes the deployed name and applies the profile invariant: an
    /// embedded development database cannot serve a remote dev
    /// deployment, so `Dev` is upgraded to `Prod`. The upgrade is logged
    /// but otherwise silent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name normalizes to nothing,
    /// the database service is incomplete, or the build override cannot
    /// be split into arguments.
    pub fn resolve(
        name: &str,
        profile: Profile,
        dev_database: DevDatabase,
        database: Option<DatabaseService>,
        build_override: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let app_name = normalize_name(name);

        let profile = if profile == Profile::Dev && dev_database.is_embedded() {
            tracing::warn!(
                "An embedded database will not work with the dev profile. Using the prod profile."
            );
            Profile::Prod
        } else {
            profile
        };

        let build_override = match build_override {
            Some(command) => Some(parse_build_override(command)?),
            None => None,
        };

        let config = Self {
            app_name,
            profile,
            database,
            build_override,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for DeployConfig {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.app_name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if self.app_name.len() > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                max: MAX_NAME_LEN,
                len: self.app_name.len(),
            });
        }

        if !self
            .app_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidNameChars {
                name: self.app_name.clone(),
            });
        }

        if let Some(ref database) = self.database {
            database.validate()?;
        }

        Ok(())
    }
}

impl fmt::Display for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} profile)", self.app_name, self.profile)
    }
}

/// Normalizes a raw name into a deployed application name
///
/// Lowercases and slugifies, then strips the slug separators entirely:
/// "My App!" becomes "myapp". Deployed names carry no hyphens.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_build_override(command: &str) -> Result<Vec<String>, ValidationError> {
    let argv = shell_words::split(command).map_err(|_| ValidationError::InvalidBuildOverride {
        command: command.to_string(),
    })?;

    if argv.is_empty() {
        return Err(ValidationError::InvalidBuildOverride {
            command: command.to_string(),
        });
    }

    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn resolve_simple(name: &str) -> DeployConfig {
        DeployConfig::resolve(name, Profile::Prod, DevDatabase::External, None, None).unwrap()
    }

    #[test]
    fn test_normalize_strips_hyphens_and_case() {
        assert_eq!(normalize_name("My Cool App"), "mycoolapp");
        assert_eq!(normalize_name("my-app"), "myapp");
        assert_eq!(normalize_name("MyApp2"), "myapp2");
    }

    #[test]
    fn test_normalize_collapses_punctuation() {
        assert_eq!(normalize_name("shop!!front--v2"), "shopfrontv2");
        assert_eq!(normalize_name("  spaced  out  "), "spacedout");
    }

    #[test]
    fn test_resolve_keeps_explicit_prod() {
        let config = resolve_simple("myapp");
        assert_eq!(config.profile, Profile::Prod);
        assert_eq!(config.app_name, "myapp");
    }

    #[test]
    fn test_dev_with_embedded_disk_upgrades_to_prod() {
        let config = DeployConfig::resolve(
            "myapp",
            Profile::Dev,
            DevDatabase::EmbeddedDisk,
            None,
            None,
        )
        .unwrap();

        assert_eq!(config.profile, Profile::Prod);
    }

    #[test]
    fn test_dev_with_embedded_memory_upgrades_to_prod() {
        let config = DeployConfig::resolve(
            "myapp",
            Profile::Dev,
            DevDatabase::EmbeddedMemory,
            None,
            None,
        )
        .unwrap();

        assert_eq!(config.profile, Profile::Prod);
    }

    #[test]
    fn test_dev_with_external_database_stays_dev() {
        let config =
            DeployConfig::resolve("myapp", Profile::Dev, DevDatabase::External, None, None)
                .unwrap();

        assert_eq!(config.profile, Profile::Dev);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let result = DeployConfig::resolve("!!!", Profile::Dev, DevDatabase::External, None, None);
        assert_eq!(result.unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn test_incomplete_database_is_rejected() {
        let result = DeployConfig::resolve(
            "myapp",
            Profile::Prod,
            DevDatabase::External,
            Some(DatabaseService {
                service: "elephantsql".to_string(),
                plan: "".to_string(),
            }),
            None,
        );

        assert_eq!(result.unwrap_err(), ValidationError::EmptyPlan);
    }

    #[test]
    fn test_build_override_is_split_into_argv() {
        let config = DeployConfig::resolve(
            "myapp",
            Profile::Prod,
            DevDatabase::External,
            None,
            Some("./gradlew bootWar -Pprod"),
        )
        .unwrap();

        assert_eq!(
            config.build_override,
            Some(vec![
                "./gradlew".to_string(),
                "bootWar".to_string(),
                "-Pprod".to_string()
            ])
        );
    }

    #[test]
    fn test_unbalanced_quotes_in_override_are_rejected() {
        let result = DeployConfig::resolve(
            "myapp",
            Profile::Prod,
            DevDatabase::External,
            None,
            Some("mvn \"package"),
        );

        assert!(matches!(
            result.unwrap_err(),
            ValidationError::InvalidBuildOverride { .. }
        ));
    }

    proptest! {
        #[test]
        fn prop_normalized_names_are_lowercase_alphanumeric(name in ".{0,80}") {
            let normalized = normalize_name(&name);
            prop_assert!(normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }

        #[test]
        fn prop_normalization_is_idempotent(name in ".{0,80}") {
            let once = normalize_name(&name);
            prop_assert_eq!(normalize_name(&once), once);
        }
    }
}

//! Error types for the deployment pipeline

use thiserror::Error;

/// Errors that can occur while preparing or driving a deployment
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Validation failed with specified reason
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Project settings could not be loaded
    #[error("Failed to load settings from '{path}': {reason}")]
    Settings {
        /// Path of the settings file.
        path: String,
        /// Why loading failed.
        reason: String,
    },

    /// A deployment file could not be written
    #[error("Failed to write '{path}': {source}")]
    Emit {
        /// Path of the file being written.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Validation errors for the deployment configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Application name cannot be empty
    #[error("Application name cannot be empty")]
    EmptyName,

    /// Application name too long
    #[error("Application name too long: max {max} characters, got {len}")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length of the name.
        len: usize,
    },

    /// Invalid characters in application name
    #[error("Invalid characters in application name: '{name}'")]
    InvalidNameChars {
        /// The invalid name.
        name: String,
    },

    /// Database service name cannot be empty
    #[error("Database service name cannot be empty")]
    EmptyService,

    /// Database service plan cannot be empty
    #[error("Database service plan cannot be empty")]
    EmptyPlan,

    /// Build override could not be split into an argument vector
    #[error("Invalid build override: '{command}'")]
    InvalidBuildOverride {
        /// The command string that failed to parse.
        command: String,
    },
}

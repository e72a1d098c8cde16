//! Core types for the deployment pipeline
//!
//! This module contains the fundamental outcome and validation types
//! shared across the pipeline.

#![allow(clippy::must_use_candidate)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step ran and succeeded
    Success,
    /// Step did not run (abort already signaled, or its predicate said no)
    Skipped,
    /// Step failed in a recoverable way; the pipeline continues
    Warning,
    /// Step failed fatally; remaining steps will be skipped
    Fatal,
}

impl StepStatus {
    /// Returns true if the step ran and succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if the step was skipped
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Returns true if the step failed recoverably
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning)
    }

    /// Returns true if the step failed fatally
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Skipped => write!(f, "SKIPPED"),
            Self::Warning => write!(f, "WARNING"),
            Self::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}

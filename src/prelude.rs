//! Prelude module for common imports

// Re-export all pipeline types with full paths
pub use crate::pipeline::config::{DatabaseService, DeployConfig, DevDatabase, Profile};
pub use crate::pipeline::engine::{
    EngineState, PipelineEngine, PipelineReport, StepRecord, TerminalState,
};
pub use crate::pipeline::errors::{PipelineError, ValidationError};
pub use crate::pipeline::state::PipelineState;
pub use crate::pipeline::step::PipelineStep;
pub use crate::pipeline::steps::{deploy_pipeline, deploy_pipeline_in};
pub use crate::pipeline::types::{StepStatus, Validate};

// Re-export executor types
pub use crate::executor::{
    CommandError, CommandResult, CommandRunner, Invocation, ProcessRunner, RunnerConfig,
};

// Re-export infrastructure helpers
pub use crate::infrastructure::{ProjectSettings, emit_deployment_files};

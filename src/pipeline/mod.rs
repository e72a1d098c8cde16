//! Deployment pipeline domain types and logic

pub mod config;
pub mod engine;
pub mod errors;
pub mod state;
pub mod step;
pub mod steps;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types from submodules
pub use config::{DatabaseService, DeployConfig, DevDatabase, Profile, normalize_name};
pub use engine::{EngineState, PipelineEngine, PipelineReport, StepRecord, TerminalState};
pub use errors::{PipelineError, ValidationError};
pub use state::PipelineState;
pub use step::PipelineStep;
pub use steps::{
    BuildArtifact, DeploySummary, InspectApp, ProvisionDatabase, PushApp, RestartApp, ToolCheck,
    deploy_pipeline, deploy_pipeline_in,
};
pub use types::{StepStatus, Validate};

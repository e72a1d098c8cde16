//! # Cloudline - Cloud Foundry deployment pipeline
//!
//! Cloudline drives the deployment of a generated web application to
//! Cloud Foundry: a fixed sequence of steps that verifies the local
//! tooling, inspects the remote environment, provisions a managed
//! database, builds the artifact, pushes it, and restarts the app when
//! it already existed — streaming each external command's output to the
//! operator as it runs.
//!
//! ## Design
//!
//! - **Argument vectors, never shell strings**: configured values cannot
//!   inject into commands.
//! - **Explicit run state**: one [`pipeline::PipelineState`] threaded
//!   through the ordered steps; abort is monotonic and only prevents new
//!   steps from starting.
//! - **Asymmetric fatality**: provisioning failures warn and continue
//!   (the service may already exist); build failures abort; push
//!   failures are reported but terminal state stays completed.
//! - **Re-run to retry**: the engine never retries a step; the whole
//!   pipeline is idempotent enough to run again.
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cli;
pub mod executor;
pub mod infrastructure;
pub mod pipeline;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use executor::{
    CommandError, CommandResult, CommandRunner, Invocation, ProcessRunner, RunnerConfig,
};
pub use infrastructure::{ProjectSettings, emit_deployment_files, init_logging};
pub use pipeline::{
    DatabaseService, DeployConfig, DevDatabase, EngineState, PipelineEngine, PipelineError,
    PipelineReport, PipelineState, PipelineStep, Profile, StepRecord, StepStatus, TerminalState,
    Validate, ValidationError, deploy_pipeline, deploy_pipeline_in,
};

/// Version of the cloudline crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

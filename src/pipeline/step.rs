//! Step abstraction
//!
//! A pipeline step is a named unit of the deployment sequence. Steps
//! read the immutable [`DeployConfig`], may invoke the command runner,
//! mutate the run's [`PipelineState`], and report a [`StepStatus`].
//!
//! Steps never return errors. Every subprocess launch failure or bad
//! exit status is handled where it happens and converted into a status
//! plus a state mutation and a log line, so the engine's run loop has
//! nothing to unwind.

use crate::executor::CommandRunner;
use crate::pipeline::config::DeployConfig;
use crate::pipeline::state::PipelineState;
use crate::pipeline::types::StepStatus;

/// A named unit of the deployment sequence
pub trait PipelineStep {
    /// Step label used in logs and the run report
    fn name(&self) -> &str;

    /// Whether this step applies to the given configuration and state
    ///
    /// The engine records the step as skipped when this returns false.
    /// The abort check is the engine's job, not the predicate's.
    fn should_run(&self, _config: &DeployConfig, _state: &PipelineState) -> bool {
        true
    }

    /// Marks the terminal deploy step
    ///
    /// Once a terminal step has begun, the engine's finalize hook runs at
    /// the end of the pipeline no matter what happens afterwards.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Runs the step
    fn run(
        &self,
        config: &DeployConfig,
        state: &mut PipelineState,
        runner: &dyn CommandRunner,
    ) -> StepStatus;
}

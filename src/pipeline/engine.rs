//! Pipeline engine
//!
//! Runs an ordered list of steps over one [`PipelineState`], checking
//! the abort flag before each step and recording a skip when it is set
//! or the step's own predicate declines. The loop always advances to the
//! next index — a step's failure is expressed through the state it
//! mutated, never through a value that could stop the iteration.
//!
//! The engine never retries a step. Re-running the whole pipeline is the
//! retry mechanism; the steps are written to tolerate that (inspection
//! re-queries, provisioning tolerates "already exists").

use crate::executor::CommandRunner;
use crate::pipeline::config::{DeployConfig, Profile};
use crate::pipeline::state::PipelineState;
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::StepStatus;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Not started
    Idle,
    /// Visiting the step at this index
    Running(usize),
    /// Finished with abort signaled
    Aborted,
    /// All steps visited (run or skipped) without abort
    Completed,
}

/// Terminal state of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalState {
    /// Abort was signaled; the run stopped short
    Aborted,
    /// Every step was visited; warnings may have occurred
    Completed,
}

impl TerminalState {
    /// Returns true when the run visited every step
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted => write!(f, "ABORTED"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// One line of the run trace
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Step label
    pub step: String,

    /// How the step ended
    pub status: StepStatus,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Identifier of this run, for correlating log lines
    pub run_id: String,

    /// Deployed application name
    pub app_name: String,

    /// Profile the run resolved to
    pub profile: Profile,

    /// Ordered step trace, finalizer included when it ran
    pub steps: Vec<StepRecord>,

    /// Terminal state
    pub terminal: TerminalState,

    /// True when any step flagged a recoverable problem
    pub warning: bool,
}

impl PipelineReport {
    /// Looks up the status of a step by name
    #[must_use]
    pub fn status_of(&self, step: &str) -> Option<StepStatus> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| record.status)
    }
}

/// Drives an ordered list of deployment steps
pub struct PipelineEngine {
    steps: Vec<Box<dyn PipelineStep>>,
    finalizer: Option<Box<dyn PipelineStep>>,
    state: EngineState,
}

impl PipelineEngine {
    /// Creates an engine with no steps
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            finalizer: None,
            state: EngineState::Idle,
        }
    }

    /// Appends a step to the fixed order
    #[must_use]
    pub fn with_step(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Sets the finalize hook
    ///
    /// The hook runs at the end of the pipeline whenever a terminal step
    /// has begun, regardless of abort.
    #[must_use]
    pub fn with_finalizer(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.finalizer = Some(step);
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of steps in the fixed order, finalizer excluded
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Runs every step in order against a fresh [`PipelineState`]
    pub fn run(&mut self, config: &DeployConfig, runner: &dyn CommandRunner) -> PipelineReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut state = PipelineState::new();
        let mut records = Vec::with_capacity(self.steps.len() + 1);

        tracing::info!(
            run_id = %run_id,
            app = %config.app_name,
            profile = %config.profile,
            steps = self.steps.len(),
            "Starting deployment pipeline"
        );

        for (index, step) in self.steps.iter().enumerate() {
            self.state = EngineState::Running(index);

            let status = if state.aborted() || !step.should_run(config, &state) {
                tracing::info!(step = step.name(), "Step skipped");
                StepStatus::Skipped
            } else {
                if step.is_terminal() {
                    state.mark_deploy_started();
                }

                tracing::info!(step = step.name(), "Step starting");
                let start = Instant::now();
                let status = step.run(config, &mut state, runner);
                tracing::info!(
                    step = step.name(),
                    status = %status,
                    duration_ms = start.elapsed().as_millis(),
                    "Step finished"
                );
                status
            };

            records.push(StepRecord {
                step: step.name().to_string(),
                status,
            });
        }

        if let Some(finalizer) = self.finalizer.as_ref() {
            if state.deploy_started() {
                let status = finalizer.run(config, &mut state, runner);
                records.push(StepRecord {
                    step: finalizer.name().to_string(),
                    status,
                });
            }
        }

        let terminal = if state.aborted() {
            TerminalState::Aborted
        } else {
            TerminalState::Completed
        };
        self.state = match terminal {
            TerminalState::Aborted => EngineState::Aborted,
            TerminalState::Completed => EngineState::Completed,
        };

        tracing::info!(run_id = %run_id, terminal = %terminal, "Pipeline finished");

        PipelineReport {
            run_id,
            app_name: config.app_name.clone(),
            profile: config.profile,
            steps: records,
            terminal,
            warning: state.has_warning(),
        }
    }
}

impl Default for PipelineEngine {
    fn default() -> Self {
        Self::new()
    }
}

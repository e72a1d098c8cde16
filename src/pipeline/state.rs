//! Mutable state threaded through a pipeline run
//!
//! The engine owns one [`PipelineState`] per run and is its only
//! long-lived mutator; steps receive it by mutable reference for the
//! duration of their invocation and must not retain it. Single-threaded
//! by design, so no synchronization is involved.

/// Shared state of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    abort: bool,
    warning: bool,
    remote_exists: Option<bool>,
    deploy_started: bool,
}

impl PipelineState {
    /// Creates a fresh run state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals that the pipeline must not start further steps
    ///
    /// Monotonic: once signaled, nothing clears it. An in-flight external
    /// command is never interrupted; abort only prevents new steps.
    pub fn signal_abort(&mut self) {
        self.abort = true;
    }

    /// Returns true once abort has been signaled
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.abort
    }

    /// Flags a recoverable problem that the operator should review
    pub fn flag_warning(&mut self) {
        self.warning = true;
    }

    /// Returns true if any step flagged a recoverable problem
    #[must_use]
    pub fn has_warning(&self) -> bool {
        self.warning
    }

    /// Records whether the remote environment already exists
    pub fn record_remote_exists(&mut self, exists: bool) {
        self.remote_exists = Some(exists);
    }

    /// Remote environment existence, `None` until inspected
    #[must_use]
    pub fn remote_exists(&self) -> Option<bool> {
        self.remote_exists
    }

    /// Marks that the terminal deploy step has begun
    pub fn mark_deploy_started(&mut self) {
        self.deploy_started = true;
    }

    /// Returns true once the terminal deploy step has begun
    #[must_use]
    pub fn deploy_started(&self) -> bool {
        self.deploy_started
    }
}

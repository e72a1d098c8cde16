//! Command execution layer
//!
//! This module owns the boundary between the pipeline and the operating
//! system: building argument-vector invocations, spawning processes and
//! streaming their output back to the operator.

mod command;

pub use command::{
    CommandError, CommandResult, CommandRunner, Invocation, ProcessRunner, RunnerConfig,
};

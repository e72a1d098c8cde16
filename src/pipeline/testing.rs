//! Test support: scripted command runner
//!
//! Compiled only for tests. The fake records every invocation so tests
//! can assert on what would have been executed, and answers from a
//! script closure so each scenario controls exit codes and output.

use crate::executor::{CommandError, CommandResult, CommandRunner, Invocation};
use std::cell::RefCell;
use std::time::Duration;

/// Scripted command runner recording every invocation
pub(crate) struct FakeRunner {
    /// Invocations in the order they were issued
    pub calls: RefCell<Vec<Invocation>>,
    script: Box<dyn Fn(&Invocation) -> Result<CommandResult, CommandError>>,
}

impl FakeRunner {
    pub(crate) fn new(
        script: impl Fn(&Invocation) -> Result<CommandResult, CommandError> + 'static,
    ) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            script: Box::new(script),
        }
    }

    /// A runner for which every command succeeds with empty output
    pub(crate) fn always_ok() -> Self {
        Self::new(|_| Ok(ok_result("")))
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of recorded invocations of the given program
    pub(crate) fn calls_to(&self, program: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|inv| inv.program == program)
            .count()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult, CommandError> {
        self.calls.borrow_mut().push(invocation.clone());
        (self.script)(invocation)
    }
}

pub(crate) fn ok_result(stdout: &str) -> CommandResult {
    CommandResult {
        exit_code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
        duration: Duration::from_millis(1),
    }
}

pub(crate) fn failed_result(exit_code: i32, stderr: &str) -> CommandResult {
    CommandResult {
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_string(),
        duration: Duration::from_millis(1),
    }
}

pub(crate) fn spawn_error(program: &str) -> CommandError {
    CommandError::Spawn {
        program: program.to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    }
}

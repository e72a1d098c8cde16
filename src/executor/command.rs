//! Command execution with streaming output
//!
//! Every external tool the pipeline touches (`cf`, `mvn`) goes through
//! this module. Commands are always invoked as a program plus an argument
//! vector; nothing is ever interpolated into a shell string, so values
//! taken from the project configuration cannot change the command being
//! run.
//!
//! Output is forwarded line-by-line while the command runs, so the
//! operator sees provisioning and build progress as it happens rather
//! than as a blob after the fact.
//!
//! A non-zero exit status is not an error here: it is returned inside
//! [`CommandResult`] for the calling step to interpret. Only failing to
//! launch the process at all (binary missing, permission denied) is
//! reported as [`CommandError`].

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path, resolved via PATH lookup
    pub program: String,

    /// Argument vector, passed through verbatim
    pub args: Vec<String>,

    /// Extra environment variables for this invocation only
    pub env: HashMap<String, String>,
}

impl Invocation {
    /// Creates an invocation from a program and its arguments
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            env: HashMap::new(),
        }
    }

    /// Creates an invocation from an already-owned argument vector
    pub fn from_argv(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: HashMap::new(),
        }
    }

    /// Adds an environment variable for this invocation
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Renders the invocation for log lines
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Result of an external command that ran to completion
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (`-1` when terminated by a signal)
    pub exit_code: i32,

    /// Accumulated standard output
    pub stdout: String,

    /// Accumulated standard error
    pub stderr: String,

    /// Duration of execution
    pub duration: Duration,
}

impl CommandResult {
    /// Returns true if the command exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns true if the command exited with a non-zero code
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.exit_code != 0
    }
}

/// Failure to run a command at all
///
/// Distinct from a non-zero exit status, which is carried in
/// [`CommandResult`] instead.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be launched
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        /// Program that could not be started.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The process launched but could not be waited on
    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        /// Program being waited on.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Seam between pipeline steps and the operating system
///
/// Steps depend on this trait rather than on `std::process` directly, so
/// tests can substitute a scripted fake and assert on what would have
/// been executed.
pub trait CommandRunner {
    /// Runs one command to completion, streaming its output
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] only when the process cannot be launched
    /// or waited on.
    fn run(&self, invocation: &Invocation) -> Result<CommandResult, CommandError>;
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Working directory for spawned commands
    pub cwd: std::path::PathBuf,

    /// Base environment variables applied to every invocation
    pub env: HashMap<String, String>,

    /// Forward output lines to the operator as they arrive
    pub streaming: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_default(),
            env: HashMap::new(),
            streaming: true,
        }
    }
}

/// Real command runner backed by `std::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    /// Creates a runner with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with the given configuration
    #[must_use]
    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Sets the working directory
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<std::path::PathBuf>) -> Self {
        self.config.cwd = cwd.into();
        self
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.current_dir(&self.config.cwd);
        cmd.envs(&self.config.env);
        cmd.envs(&invocation.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult, CommandError> {
        tracing::debug!(command = %invocation.display(), "Executing command");

        let start = Instant::now();
        let mut child = self
            .command(invocation)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        // Both pipes were requested above, so take() cannot miss.
        let stdout = child.stdout.take().expect("stdout pipe requested");
        let stderr = child.stderr.take().expect("stderr pipe requested");

        let streaming = self.config.streaming;
        let stdout_buf = Arc::new(Mutex::new(String::new()));
        let stderr_buf = Arc::new(Mutex::new(String::new()));

        let stdout_thread = {
            let buf = Arc::clone(&stdout_buf);
            std::thread::spawn(move || {
                let reader = io::BufReader::new(stdout);
                for line in reader.lines().map_while(Result::ok) {
                    if streaming {
                        println!("{line}");
                    }
                    let mut guard = buf.lock().unwrap();
                    guard.push_str(&line);
                    guard.push('\n');
                }
            })
        };

        let stderr_thread = {
            let buf = Arc::clone(&stderr_buf);
            std::thread::spawn(move || {
                let reader = io::BufReader::new(stderr);
                for line in reader.lines().map_while(Result::ok) {
                    if streaming {
                        eprintln!("{line}");
                    }
                    let mut guard = buf.lock().unwrap();
                    guard.push_str(&line);
                    guard.push('\n');
                }
            })
        };

        let status = child.wait().map_err(|source| CommandError::Wait {
            program: invocation.program.clone(),
            source,
        })?;
        let _ = stdout_thread.join();
        let _ = stderr_thread.join();

        let stdout = stdout_buf.lock().unwrap().clone();
        let stderr = stderr_buf.lock().unwrap().clone();
        let exit_code = status.code().unwrap_or(-1);

        tracing::debug!(
            command = %invocation.display(),
            exit_code,
            duration_ms = start.elapsed().as_millis(),
            "Command finished"
        );

        Ok(CommandResult {
            exit_code,
            stdout,
            stderr,
            duration: start.elapsed(),
        })
    }
}

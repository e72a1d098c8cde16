//! Concrete deployment steps
//!
//! The fixed deployment sequence: tool check, remote inspection,
//! database provisioning, build, push, restart. Order matters — earlier
//! steps populate [`PipelineState`] for later ones — and the engine runs
//! them exactly in the order [`deploy_pipeline`] wires them.
//!
//! Fatality is deliberately asymmetric. A failed provisioning is a
//! warning because the service may already exist from a prior run; a
//! failed build is fatal because nothing downstream can succeed without
//! an artifact; a failed push is reported but changes nothing — it is
//! the last actionable step.

use crate::executor::{CommandRunner, Invocation};
use crate::pipeline::config::{DeployConfig, Profile};
use crate::pipeline::engine::PipelineEngine;
use crate::pipeline::state::PipelineState;
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::StepStatus;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// The Cloud Foundry command line interface
pub const CF: &str = "cf";

/// The Maven build tool
pub const MVN: &str = "mvn";

/// Where the deployment manifest is written before the pipeline starts
pub const MANIFEST_PATH: &str = "deploy/cloudfoundry/manifest.yml";

/// Install source named in the tool-check remediation message
const CF_INSTALL_URL: &str = "https://github.com/cloudfoundry/cli/releases";

/// Markers the platform prints when the operator is not logged in
static AUTH_FAILURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)cf login|not logged in").unwrap());

/// Verifies the `cf` CLI is installed and responding
pub struct ToolCheck;

impl PipelineStep for ToolCheck {
    fn name(&self) -> &str {
        "tool-check"
    }

    fn run(
        &self,
        _config: &DeployConfig,
        state: &mut PipelineState,
        runner: &dyn CommandRunner,
    ) -> StepStatus {
        tracing::info!("Checking for the cf command line interface");

        match runner.run(&Invocation::new(CF, &["-v"])) {
            Ok(result) if result.is_success() => StepStatus::Success,
            Ok(result) => {
                tracing::error!(
                    exit_code = result.exit_code,
                    "The cf command line interface is not working. You can install it via {}",
                    CF_INSTALL_URL
                );
                state.signal_abort();
                StepStatus::Fatal
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "The cf command line interface is not available. You can install it via {}",
                    CF_INSTALL_URL
                );
                state.signal_abort();
                StepStatus::Fatal
            }
        }
    }
}

/// Queries whether the deployment target already exists on the platform
///
/// Also the authentication gate: the platform answers an unauthenticated
/// query with a prompt to run `cf login`, which this step treats as
/// fatal.
pub struct InspectApp;

impl PipelineStep for InspectApp {
    fn name(&self) -> &str {
        "inspect-app"
    }

    // Idempotent: a re-run that already knows the answer skips the query.
    fn should_run(&self, _config: &DeployConfig, state: &PipelineState) -> bool {
        state.remote_exists().is_none()
    }

    fn run(
        &self,
        config: &DeployConfig,
        state: &mut PipelineState,
        runner: &dyn CommandRunner,
    ) -> StepStatus {
        tracing::info!("Checking for an existing Cloud Foundry hosting environment");

        match runner.run(&Invocation::new(CF, &["app", &config.app_name])) {
            Ok(result) => {
                if AUTH_FAILURE.is_match(&result.stdout) || AUTH_FAILURE.is_match(&result.stderr) {
                    tracing::error!(
                        "Not authenticated. Run 'cf login' to log in to your Cloud Foundry \
                         account and try again."
                    );
                    state.signal_abort();
                    return StepStatus::Fatal;
                }

                let exists = result.is_success();
                state.record_remote_exists(exists);
                tracing::info!(app = %config.app_name, exists, "Remote environment inspected");
                StepStatus::Success
            }
            Err(err) => {
                tracing::error!(error = %err, "Could not inspect the remote environment");
                state.signal_abort();
                StepStatus::Fatal
            }
        }
    }
}

/// Creates the managed database service when one is configured
pub struct ProvisionDatabase;

impl PipelineStep for ProvisionDatabase {
    fn name(&self) -> &str {
        "provision-database"
    }

    fn should_run(&self, config: &DeployConfig, _state: &PipelineState) -> bool {
        config.database.is_some()
    }

    fn run(
        &self,
        config: &DeployConfig,
        state: &mut PipelineState,
        runner: &dyn CommandRunner,
    ) -> StepStatus {
        let Some(database) = config.database.as_ref() else {
            return StepStatus::Skipped;
        };

        tracing::info!(
            service = %database.service,
            plan = %database.plan,
            "Creating the database service, this may take a couple minutes"
        );

        let invocation = Invocation::new(
            CF,
            &[
                "create-service",
                &database.service,
                &database.plan,
                &config.app_name,
            ],
        );

        match runner.run(&invocation) {
            Ok(result) if result.is_success() => StepStatus::Success,
            Ok(result) => {
                // The service may already exist from a prior run.
                tracing::warn!(
                    exit_code = result.exit_code,
                    "Database provisioning failed; continuing with the deployment"
                );
                state.flag_warning();
                StepStatus::Warning
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Database provisioning could not run; continuing with the deployment"
                );
                state.flag_warning();
                StepStatus::Warning
            }
        }
    }
}

/// Builds the application artifact with the resolved profile
pub struct BuildArtifact;

impl BuildArtifact {
    fn invocation(config: &DeployConfig) -> Invocation {
        if let Some(argv) = config.build_override.as_ref() {
            return Invocation::from_argv(argv[0].clone(), argv[1..].to_vec());
        }

        match config.profile {
            Profile::Prod => Invocation::new(MVN, &["package", "-Pprod", "-DskipTests"]),
            Profile::Dev => Invocation::new(MVN, &["package", "-DskipTests"]),
        }
    }
}

impl PipelineStep for BuildArtifact {
    fn name(&self) -> &str {
        "build"
    }

    fn run(
        &self,
        config: &DeployConfig,
        state: &mut PipelineState,
        runner: &dyn CommandRunner,
    ) -> StepStatus {
        tracing::info!(profile = %config.profile, "Building the application");

        match runner.run(&Self::invocation(config)) {
            Ok(result) if result.is_success() => StepStatus::Success,
            Ok(result) => {
                tracing::error!(exit_code = result.exit_code, "Build failed");
                if !result.stderr.is_empty() {
                    eprintln!("{}", result.stderr);
                }
                state.signal_abort();
                StepStatus::Fatal
            }
            Err(err) => {
                tracing::error!(error = %err, "Build tool could not be started");
                state.signal_abort();
                StepStatus::Fatal
            }
        }
    }
}

/// Pushes the built artifact to the platform
///
/// Terminal step: once it has begun, the engine's finalize hook runs at
/// pipeline end regardless of later state.
pub struct PushApp {
    target_dir: PathBuf,
}

impl PushApp {
    /// Creates the push step looking for artifacts under `target_dir`
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }
}

impl Default for PushApp {
    fn default() -> Self {
        Self::new("target")
    }
}

impl PipelineStep for PushApp {
    fn name(&self) -> &str {
        "push"
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn run(
        &self,
        config: &DeployConfig,
        state: &mut PipelineState,
        runner: &dyn CommandRunner,
    ) -> StepStatus {
        tracing::info!("Pushing the application to Cloud Foundry");

        let Some(artifact) = find_war_artifact(&self.target_dir) else {
            tracing::error!(
                dir = %self.target_dir.display(),
                "No .war artifact found; was the build step successful?"
            );
            state.flag_warning();
            return StepStatus::Warning;
        };
        let artifact = artifact.to_string_lossy().into_owned();

        let invocation = Invocation::new(CF, &["push", "-f", MANIFEST_PATH, "-p", &artifact]);

        match runner.run(&invocation) {
            Ok(result) if result.is_success() => {
                println!("\nYour app should now be live");
                println!(
                    "After application modification, repackage it with\n\tmvn package -P{} -DskipTests",
                    config.profile
                );
                println!(
                    "And then re-deploy it with\n\tcf push -f {} -p {}",
                    MANIFEST_PATH, artifact
                );
                StepStatus::Success
            }
            Ok(result) => {
                // Past the point of easy recovery; reported, never fatal.
                tracing::error!(exit_code = result.exit_code, "Push failed");
                state.flag_warning();
                StepStatus::Warning
            }
            Err(err) => {
                tracing::error!(error = %err, "Push command could not be started");
                state.flag_warning();
                StepStatus::Warning
            }
        }
    }
}

/// Restarts a pre-existing remote environment so it picks up the push
pub struct RestartApp;

impl PipelineStep for RestartApp {
    fn name(&self) -> &str {
        "restart"
    }

    fn should_run(&self, _config: &DeployConfig, state: &PipelineState) -> bool {
        state.remote_exists() == Some(true)
    }

    fn run(
        &self,
        config: &DeployConfig,
        state: &mut PipelineState,
        runner: &dyn CommandRunner,
    ) -> StepStatus {
        tracing::info!(app = %config.app_name, "Restarting the Cloud Foundry app");

        match runner.run(&Invocation::new(CF, &["restart", &config.app_name])) {
            Ok(result) if result.is_success() => {
                if state.has_warning() {
                    println!(
                        "You may need to address the issues mentioned above and restart the \
                         server for the app to work correctly:\n\tcf restart {}",
                        config.app_name
                    );
                }
                StepStatus::Success
            }
            Ok(result) => {
                tracing::warn!(exit_code = result.exit_code, "Restart failed");
                state.flag_warning();
                StepStatus::Warning
            }
            Err(err) => {
                tracing::warn!(error = %err, "Restart command could not be started");
                state.flag_warning();
                StepStatus::Warning
            }
        }
    }
}

/// Finalize hook: tells the operator where the deployment landed
pub struct DeploySummary;

impl PipelineStep for DeploySummary {
    fn name(&self) -> &str {
        "summary"
    }

    fn run(
        &self,
        config: &DeployConfig,
        state: &mut PipelineState,
        _runner: &dyn CommandRunner,
    ) -> StepStatus {
        if state.has_warning() {
            println!(
                "\nDeployment of '{}' finished with warnings; review the messages above.",
                config.app_name
            );
        } else {
            println!("\nDeployment of '{}' finished.", config.app_name);
        }
        println!("After application modification, re-deploy it with\n\tcloudline deploy");
        StepStatus::Success
    }
}

/// Wires the fixed deployment sequence
#[must_use]
pub fn deploy_pipeline() -> PipelineEngine {
    PipelineEngine::new()
        .with_step(Box::new(ToolCheck))
        .with_step(Box::new(InspectApp))
        .with_step(Box::new(ProvisionDatabase))
        .with_step(Box::new(BuildArtifact))
        .with_step(Box::new(PushApp::default()))
        .with_step(Box::new(RestartApp))
        .with_finalizer(Box::new(DeploySummary))
}

/// Wires the fixed sequence against a specific build output directory
#[must_use]
pub fn deploy_pipeline_in(target_dir: impl Into<PathBuf>) -> PipelineEngine {
    PipelineEngine::new()
        .with_step(Box::new(ToolCheck))
        .with_step(Box::new(InspectApp))
        .with_step(Box::new(ProvisionDatabase))
        .with_step(Box::new(BuildArtifact))
        .with_step(Box::new(PushApp::new(target_dir)))
        .with_step(Box::new(RestartApp))
        .with_finalizer(Box::new(DeploySummary))
}

/// Finds the newest `.war` under the build output directory
///
/// The push command takes one concrete artifact path; commands are never
/// run through a shell, so there is no glob expansion to lean on.
fn find_war_artifact(target_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(target_dir).ok()?;

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "war"))
        .max_by_key(|path| {
            path.metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::{DatabaseService, DevDatabase};
    use crate::pipeline::testing::{failed_result, ok_result, spawn_error, FakeRunner};
    use std::fs;

    fn test_config() -> DeployConfig {
        DeployConfig::resolve(
            "myapp",
            Profile::Dev,
            DevDatabase::External,
            Some(DatabaseService {
                service: "pg".to_string(),
                plan: "free".to_string(),
            }),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_tool_check_success() {
        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();

        let status = ToolCheck.run(&test_config(), &mut state, &runner);

        assert!(status.is_success());
        assert!(!state.aborted());
        assert_eq!(runner.calls.borrow()[0].program, CF);
        assert_eq!(runner.calls.borrow()[0].args, vec!["-v"]);
    }

    #[test]
    fn test_tool_check_missing_binary_aborts() {
        let runner = FakeRunner::new(|inv| Err(spawn_error(&inv.program)));
        let mut state = PipelineState::new();

        let status = ToolCheck.run(&test_config(), &mut state, &runner);

        assert!(status.is_fatal());
        assert!(state.aborted());
    }

    #[test]
    fn test_inspect_records_existing_app() {
        let runner = FakeRunner::new(|_| Ok(ok_result("name: myapp\nstate: started")));
        let mut state = PipelineState::new();

        let status = InspectApp.run(&test_config(), &mut state, &runner);

        assert!(status.is_success());
        assert_eq!(state.remote_exists(), Some(true));
    }

    #[test]
    fn test_inspect_records_missing_app() {
        let runner = FakeRunner::new(|_| Ok(failed_result(1, "App 'myapp' not found")));
        let mut state = PipelineState::new();

        let status = InspectApp.run(&test_config(), &mut state, &runner);

        assert!(status.is_success());
        assert_eq!(state.remote_exists(), Some(false));
    }

    #[test]
    fn test_inspect_detects_unauthenticated_operator() {
        let runner =
            FakeRunner::new(|_| Ok(failed_result(1, "Not logged in. Use 'cf login' to log in.")));
        let mut state = PipelineState::new();

        let status = InspectApp.run(&test_config(), &mut state, &runner);

        assert!(status.is_fatal());
        assert!(state.aborted());
        assert_eq!(state.remote_exists(), None);
    }

    #[test]
    fn test_inspect_skips_when_answer_already_known() {
        let mut state = PipelineState::new();
        state.record_remote_exists(true);

        assert!(!InspectApp.should_run(&test_config(), &state));
    }

    #[test]
    fn test_provision_skipped_without_database() {
        let config =
            DeployConfig::resolve("myapp", Profile::Prod, DevDatabase::External, None, None)
                .unwrap();
        let state = PipelineState::new();

        assert!(!ProvisionDatabase.should_run(&config, &state));
    }

    #[test]
    fn test_provision_failure_is_a_warning() {
        let runner = FakeRunner::new(|_| Ok(failed_result(1, "Service instance already exists")));
        let mut state = PipelineState::new();

        let status = ProvisionDatabase.run(&test_config(), &mut state, &runner);

        assert!(status.is_warning());
        assert!(state.has_warning());
        assert!(!state.aborted());
    }

    #[test]
    fn test_provision_passes_service_plan_and_app() {
        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();

        ProvisionDatabase.run(&test_config(), &mut state, &runner);

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].args, vec!["create-service", "pg", "free", "myapp"]);
    }

    #[test]
    fn test_build_uses_prod_flags_for_prod_profile() {
        let config =
            DeployConfig::resolve("myapp", Profile::Prod, DevDatabase::External, None, None)
                .unwrap();
        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();

        BuildArtifact.run(&config, &mut state, &runner);

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].program, MVN);
        assert_eq!(calls[0].args, vec!["package", "-Pprod", "-DskipTests"]);
    }

    #[test]
    fn test_build_uses_dev_flags_for_dev_profile() {
        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();

        BuildArtifact.run(&test_config(), &mut state, &runner);

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].args, vec!["package", "-DskipTests"]);
    }

    #[test]
    fn test_build_honors_override() {
        let config = DeployConfig::resolve(
            "myapp",
            Profile::Prod,
            DevDatabase::External,
            None,
            Some("./gradlew bootWar"),
        )
        .unwrap();
        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();

        BuildArtifact.run(&config, &mut state, &runner);

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].program, "./gradlew");
        assert_eq!(calls[0].args, vec!["bootWar"]);
    }

    #[test]
    fn test_build_failure_aborts() {
        let runner = FakeRunner::new(|_| Ok(failed_result(1, "BUILD FAILURE")));
        let mut state = PipelineState::new();

        let status = BuildArtifact.run(&test_config(), &mut state, &runner);

        assert!(status.is_fatal());
        assert!(state.aborted());
    }

    #[test]
    fn test_push_references_manifest_and_artifact() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("myapp.war"), b"war").unwrap();

        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();

        let status = PushApp::new(dir.path()).run(&test_config(), &mut state, &runner);

        assert!(status.is_success());
        let calls = runner.calls.borrow();
        assert_eq!(calls[0].args[0], "push");
        assert_eq!(calls[0].args[1], "-f");
        assert_eq!(calls[0].args[2], MANIFEST_PATH);
        assert!(calls[0].args[4].ends_with("myapp.war"));
    }

    #[test]
    fn test_push_failure_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("myapp.war"), b"war").unwrap();

        let runner = FakeRunner::new(|_| Ok(failed_result(1, "Staging failed")));
        let mut state = PipelineState::new();

        let status = PushApp::new(dir.path()).run(&test_config(), &mut state, &runner);

        assert!(status.is_warning());
        assert!(!state.aborted());
    }

    #[test]
    fn test_push_without_artifact_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();

        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();

        let status = PushApp::new(dir.path()).run(&test_config(), &mut state, &runner);

        assert!(status.is_warning());
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_restart_runs_only_for_existing_remote() {
        let config = test_config();
        let mut state = PipelineState::new();

        assert!(!RestartApp.should_run(&config, &state));

        state.record_remote_exists(false);
        assert!(!RestartApp.should_run(&config, &state));

        state.record_remote_exists(true);
        assert!(RestartApp.should_run(&config, &state));
    }

    #[test]
    fn test_restart_predicate_ignores_warning() {
        let config = test_config();
        let mut state = PipelineState::new();
        state.record_remote_exists(true);
        state.flag_warning();

        assert!(RestartApp.should_run(&config, &state));
    }

    #[test]
    fn test_restart_invokes_cf_restart() {
        let runner = FakeRunner::always_ok();
        let mut state = PipelineState::new();
        state.record_remote_exists(true);

        let status = RestartApp.run(&test_config(), &mut state, &runner);

        assert!(status.is_success());
        let calls = runner.calls.borrow();
        assert_eq!(calls[0].args, vec!["restart", "myapp"]);
    }

    #[test]
    fn test_find_war_artifact_picks_war_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.jar"), b"jar").unwrap();
        fs::write(dir.path().join("app.war"), b"war").unwrap();

        let artifact = find_war_artifact(dir.path()).unwrap();
        assert!(artifact.to_string_lossy().ends_with("app.war"));
    }

    #[test]
    fn test_find_war_artifact_missing_dir() {
        assert_eq!(find_war_artifact(Path::new("/nonexistent/target")), None);
    }
}

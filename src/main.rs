//! cloudline - Cloud Foundry deployment pipeline
//!
//! Deploys a generated web application to Cloud Foundry: checks the
//! local tooling, inspects the remote environment, provisions the
//! database service, builds the artifact, pushes it, and restarts the
//! app when it already existed.
//!
//! ## Commands
//!
//! - `cloudline deploy` - Run the full deployment pipeline
//! - `cloudline check` - Validate settings and local tooling
//! - `cloudline completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # See whether the project is ready
//! cloudline check
//!
//! # Deploy with the settings from cloudline.yml
//! cloudline deploy
//!
//! # Deploy under a different name with the production profile
//! cloudline deploy --name shopfront --profile prod
//! ```
//!
//! The process exits non-zero when the pipeline aborts; a completed run
//! with warnings still exits zero.

use std::process::ExitCode;

fn main() -> ExitCode {
    match cloudline::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if std::env::var("CLOUDLINE_VERBOSE").is_ok() {
                eprintln!("{:?}", e);
            }
            ExitCode::FAILURE
        }
    }
}

//! Command-line interface for cloudline
//!
//! - `deploy`: run the full deployment pipeline
//! - `check`: validate settings and local tooling without deploying
//! - `completions`: generate shell completions

pub mod check;
pub mod completions;
pub mod deploy;

use crate::pipeline::Profile;
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for cloudline
#[derive(Parser, Debug)]
#[command(name = "cloudline")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy the application to Cloud Foundry
    Deploy {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Settings file (defaults to cloudline.yml in the project directory)
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Name to deploy as
        #[arg(short, long)]
        name: Option<String>,
        /// Build profile
        #[arg(short, long, value_enum)]
        profile: Option<ProfileArg>,
        /// Report format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Validate settings and local tooling without deploying
    Check {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Dev,
    Prod,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
///
/// # Errors
///
/// Returns an error when the invoked command fails; `main` maps it to a
/// non-zero exit status.
pub fn run() -> Result<()> {
    let args = Args::parse();

    crate::infrastructure::init_logging(args.verbose);

    match args.command {
        Command::Deploy {
            dir,
            settings,
            name,
            profile,
            format,
        } => {
            let options = deploy::DeployOptions {
                project_dir: dir,
                settings_file: settings,
                name,
                profile: profile.map(|p| match p {
                    ProfileArg::Dev => Profile::Dev,
                    ProfileArg::Prod => Profile::Prod,
                }),
                format: match format {
                    Some(FormatArg::Json) => deploy::ReportFormat::Json,
                    Some(FormatArg::Text) | None => deploy::ReportFormat::Text,
                },
            };

            deploy::deploy(&options)?;
        }
        Command::Check { dir } => {
            check::check_environment(&dir)?;
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let rendered = completions::generate_completions(shell_enum)?;

            if let Some(output_path) = output {
                completions::save_completions(&rendered, &output_path)?;
            } else {
                println!("{rendered}");
            }
        }
    }

    Ok(())
}

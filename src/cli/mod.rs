//! CLI command handling.
//!
//! Provides subcommands for:
//! - Running the full container workflow (`run`, the default)
//! - Checking whether the Docker daemon is reachable (`check`)

mod check;

pub use check::run_check_command;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{ColorChoice, Parser, Subcommand};

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "dockerup")]
#[command(about = "Start a MySQL container, wait until it answers, query it, then stop it")]
#[command(
    long_about = "dockerup drives a MySQL container through the Docker Engine API.\nExamples:\n  dockerup            # Run the workflow with defaults\n  dockerup check      # Is Docker available?\n  dockerup --max-attempts 20 --interval-secs 2"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file path (TOML; env vars take precedence over it)
    #[arg(short, long, global = true, env = "DOCKERUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum readiness probes before giving up
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Seconds to sleep before each readiness probe
    #[arg(long, global = true)]
    pub interval_secs: Option<u64>,

    /// Leave the container running if the workflow fails
    #[arg(long, global = true)]
    pub keep_on_failure: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create, start, wait for, query and stop the MySQL container (default)
    Run,

    /// Report the Docker daemon version, or why it cannot be reached
    Check,
}

impl Cli {
    /// Load `.env` (from `env_file`, or the working directory), then parse `args`.
    ///
    /// The file is read first so a `DOCKERUP_CONFIG` set there reaches `--config`.
    pub fn load_from<I, T>(env_file: Option<&Path>, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let _ = match env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        Self::try_parse_from(args)
    }

    /// Check if we should run the workflow (default behavior or explicit `run` command).
    pub fn should_run_workflow(&self) -> bool {
        matches!(self.command, None | Some(Command::Run))
    }

    /// Config overrides given on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            max_attempts: self.max_attempts,
            interval_secs: self.interval_secs,
            keep_on_failure: self.keep_on_failure,
        }
    }
}

//! Error types for dockerup.

use std::time::Duration;

use crate::container::ContainerError;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config file {path}: {reason}")]
    File { path: String, reason: String },
}

/// A single failed readiness probe.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    /// The service did not accept the connection (refused, reset, DNS).
    #[error("{target} unreachable: {reason}")]
    Unreachable { target: String, reason: String },

    /// The service answered but rejected the check (auth failure, bad status).
    #[error("{target} rejected probe: {reason}")]
    Rejected { target: String, reason: String },

    /// The probe did not complete in time.
    #[error("{target} probe timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },
}

/// Terminal outcome of a readiness wait that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ReadinessError {
    /// Every attempt in the retry budget failed.
    #[error("service not ready after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: ProbeError,
    },

    /// The wait was cancelled before the service became ready.
    #[error("readiness wait cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl ReadinessError {
    /// Number of probes that ran before the wait ended.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts } => *attempts,
        }
    }

    /// The error of the final probe, if the budget was exhausted.
    pub fn last_probe_error(&self) -> Option<&ProbeError> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Errors from the query collaborator.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Query against `{table}` failed: {reason}")]
    Failed { table: String, reason: String },

    #[error("Table `{table}` returned no rows")]
    NoRows { table: String },
}

/// A failure of the end-to-end workflow, tagged with the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Could not reach Docker, or create or start the container.
    #[error("setup failed")]
    Setup(#[source] ContainerError),

    /// The database never became reachable.
    #[error("database did not become ready")]
    Readiness(#[from] ReadinessError),

    /// The query against the ready database failed.
    #[error("query failed")]
    Query(#[from] QueryError),

    /// Stopping the container failed after the workload completed.
    #[error("teardown failed")]
    Teardown(#[source] ContainerError),

    /// The run was cancelled outside the readiness wait.
    #[error("cancelled during {stage}")]
    Cancelled { stage: &'static str },
}

impl WorkflowError {
    /// Short stage label used in logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Readiness(_) => "readiness",
            Self::Query(_) => "query",
            Self::Teardown(_) => "teardown",
            Self::Cancelled { stage } => *stage,
        }
    }
}

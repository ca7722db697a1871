//! dockerup: run a throwaway MySQL container and prove it answers.
//!
//! The [`workflow::Workflow`] creates and starts the container through the
//! Docker Engine API, blocks in a [`readiness::ReadinessWaiter`] until the
//! database accepts a ping, loads one row, and stops the container again.

pub mod cli;
pub mod config;
pub mod container;
pub mod db;
pub mod error;
pub mod probe;
pub mod readiness;
pub mod testing;
pub mod workflow;

pub use config::Config;
pub use error::{ConfigError, ProbeError, QueryError, ReadinessError, WorkflowError};
pub use readiness::{Readiness, ReadinessPolicy, ReadinessWaiter, RetryState};
pub use workflow::{RunReport, Workflow};

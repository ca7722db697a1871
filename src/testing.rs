//! Test doubles for the workflow's collaborators.
//!
//! Provides:
//! - [`StubRuntime`]: records container lifecycle calls, optionally failing one stage
//! - [`StubDatabase`]: fails a configurable number of pings, then serves a fixed id
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dockerup::testing::{StubDatabase, StubRuntime};
//!
//! let runtime = Arc::new(StubRuntime::new());
//! let database = Arc::new(StubDatabase::ready_after(3).with_stored_id(42));
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::container::{ContainerError, ContainerRuntime, ContainerSpec};
use crate::db::Database;
use crate::error::{ProbeError, QueryError};
use crate::probe::Probe;

/// Which lifecycle call a [`StubRuntime`] should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    Create,
    Start,
    Stop,
}

/// One recorded lifecycle call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeCall {
    Create { name: String },
    Start { id: String },
    Stop { id: String, timeout: Duration },
}

/// A [`ContainerRuntime`] that records calls instead of talking to Docker.
#[derive(Debug, Default)]
pub struct StubRuntime {
    calls: Mutex<Vec<RuntimeCall>>,
    fail_at: Option<FailAt>,
}

impl StubRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given stage with a Docker-style error.
    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    /// Calls seen so far, in order.
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: RuntimeCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl ContainerRuntime for StubRuntime {
    async fn create(&self, spec: &ContainerSpec) -> Result<String, ContainerError> {
        self.record(RuntimeCall::Create {
            name: spec.name.clone(),
        });
        if self.fail_at == Some(FailAt::Create) {
            return Err(ContainerError::CreationFailed {
                name: spec.name.clone(),
                reason: "No such image".to_string(),
            });
        }
        Ok(format!("{}-id", spec.name))
    }

    async fn start(&self, id: &str) -> Result<(), ContainerError> {
        self.record(RuntimeCall::Start { id: id.to_string() });
        if self.fail_at == Some(FailAt::Start) {
            return Err(ContainerError::StartFailed {
                id: id.to_string(),
                reason: "port is already allocated".to_string(),
            });
        }
        Ok(())
    }

    async fn stop(&self, id: &str, timeout: Duration) -> Result<(), ContainerError> {
        self.record(RuntimeCall::Stop {
            id: id.to_string(),
            timeout,
        });
        if self.fail_at == Some(FailAt::Stop) {
            return Err(ContainerError::StopFailed {
                id: id.to_string(),
                reason: "daemon went away".to_string(),
            });
        }
        Ok(())
    }
}

/// A [`Database`] whose pings fail a fixed number of times.
#[derive(Debug)]
pub struct StubDatabase {
    failures_remaining: AtomicU32,
    pings: AtomicU32,
    queries: AtomicU32,
    stored_id: Option<i64>,
    query_fails: bool,
    query_delay: Duration,
}

impl StubDatabase {
    /// Ready from the first ping.
    pub fn ready() -> Self {
        Self::ready_after(0)
    }

    /// Fails the first `failures` pings with "connection refused".
    pub fn ready_after(failures: u32) -> Self {
        Self {
            failures_remaining: AtomicU32::new(failures),
            pings: AtomicU32::new(0),
            queries: AtomicU32::new(0),
            stored_id: Some(1),
            query_fails: false,
            query_delay: Duration::ZERO,
        }
    }

    /// Never answers a ping.
    pub fn never_ready() -> Self {
        Self::ready_after(u32::MAX)
    }

    pub fn with_stored_id(mut self, id: i64) -> Self {
        self.stored_id = Some(id);
        self
    }

    /// The queried table exists but is empty.
    pub fn with_empty_table(mut self) -> Self {
        self.stored_id = None;
        self
    }

    pub fn with_failing_query(mut self) -> Self {
        self.query_fails = true;
        self
    }

    /// The query takes `delay` of tokio time before answering.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub fn pings(&self) -> u32 {
        self.pings.load(Ordering::Relaxed)
    }

    pub fn queries(&self) -> u32 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Probe for StubDatabase {
    fn target(&self) -> String {
        "mysql://root@stub:7706/dockerup".to_string()
    }

    async fn check(&self) -> Result<(), ProbeError> {
        self.pings.fetch_add(1, Ordering::Relaxed);
        let remaining = self.failures_remaining.load(Ordering::Relaxed);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.failures_remaining.fetch_sub(1, Ordering::Relaxed);
            }
            return Err(ProbeError::Unreachable {
                target: self.target(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Database for StubDatabase {
    async fn load_first_id(&self, table: &str) -> Result<i64, QueryError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }
        if self.query_fails {
            return Err(QueryError::Failed {
                table: table.to_string(),
                reason: format!("Table 'dockerup.{}' doesn't exist", table),
            });
        }
        self.stored_id.ok_or_else(|| QueryError::NoRows {
            table: table.to_string(),
        })
    }
}

//! The end-to-end run: create, start, wait, query, stop.
//!
//! ```text
//!   create ──▶ start ──▶ wait until ping ok ──▶ load first id ──▶ stop
//!     │          │               │                    │            │
//!     └─ Setup ──┘          Readiness               Query      Teardown
//! ```
//!
//! Every stage failure aborts the run. When the wait or the query fails the
//! started container is stopped on a best-effort basis first (auto-remove
//! then deletes it), unless `keep_on_failure` is set for debugging.
//!
//! Cancellation is honored before create, during the wait and during the
//! query. An in-flight create or start call always completes; a cancel that
//! lands then is seen by the wait, which returns before its first probe.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::container::ContainerRuntime;
use crate::db::Database;
use crate::error::WorkflowError;
use crate::readiness::{Readiness, ReadinessWaiter};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub container_id: String,
    pub readiness: Readiness,
    /// `id` of the first row in the queried table.
    pub stored_id: i64,
}

/// Drives one container through its whole lifecycle.
pub struct Workflow {
    runtime: Arc<dyn ContainerRuntime>,
    database: Arc<dyn Database>,
    config: Config,
    cancel: CancellationToken,
}

impl Workflow {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        database: Arc<dyn Database>,
        config: Config,
    ) -> Self {
        Self {
            runtime,
            database,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling `token` aborts the run at the next cancellation point.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn run(&self) -> Result<RunReport, WorkflowError> {
        let spec = self.config.container_spec();
        if self.cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled { stage: "setup" });
        }

        tracing::info!("Container creating...");
        let container_id = self
            .runtime
            .create(&spec)
            .await
            .map_err(WorkflowError::Setup)?;
        tracing::info!("Created! ContainerID is {}", container_id);

        tracing::info!("Container starting...");
        self.runtime
            .start(&container_id)
            .await
            .map_err(WorkflowError::Setup)?;
        tracing::info!("Container started!");
        if let Some(endpoint) = spec.primary_endpoint() {
            tracing::debug!(
                "Port {} published on {}",
                endpoint.container_port,
                endpoint
            );
        }

        let (readiness, stored_id) = match self.exercise().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.abandon(&container_id).await;
                return Err(e);
            }
        };

        tracing::info!("Container stopping...");
        self.runtime
            .stop(&container_id, self.config.container.stop_timeout)
            .await
            .map_err(WorkflowError::Teardown)?;
        tracing::info!("Container stopped!");
        tracing::info!("Maybe, container is already removed by \"AutoRemove\" option");

        Ok(RunReport {
            container_id,
            readiness,
            stored_id,
        })
    }

    /// Wait for the database, then run the query.
    async fn exercise(&self) -> Result<(Readiness, i64), WorkflowError> {
        tracing::info!("Starting mysql process");
        let waiter = ReadinessWaiter::new(self.config.readiness.to_policy())
            .with_cancellation(self.cancel.clone());

        let readiness = waiter.wait(self.database.as_ref()).await?;
        tracing::info!(
            "OK! Container started! ({} attempts, {:?})",
            readiness.attempts,
            readiness.elapsed
        );

        let stored_id = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(WorkflowError::Cancelled { stage: "query" });
            }
            result = self.database.load_first_id(&self.config.query.table) => result?,
        };
        tracing::info!("DB access is Succeed! Stored ID is {}", stored_id);

        Ok((readiness, stored_id))
    }

    /// Best-effort stop after a failure.
    async fn abandon(&self, container_id: &str) {
        if self.config.container.keep_on_failure {
            tracing::info!(
                "Keeping container running (keep_on_failure=true): {}",
                container_id
            );
            return;
        }

        tracing::info!("Stopping container after failure: {}", container_id);
        if let Err(e) = self
            .runtime
            .stop(container_id, self.config.container.stop_timeout)
            .await
        {
            tracing::warn!("Cleanup stop failed for {}: {}", container_id, e);
        }
    }
}

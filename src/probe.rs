//! Readiness probes for dependent services.
//!
//! A probe is one connectivity check. It either succeeds or returns a
//! [`ProbeError`] describing why the service is not usable yet. Every
//! [`crate::db::Database`] is a probe: the MySQL session pings the server.

use async_trait::async_trait;

use crate::error::ProbeError;

/// A single health check against an external service.
#[async_trait]
pub trait Probe: Send + Sync {
    /// What is being probed (address or URL, no credentials), for logs and errors.
    fn target(&self) -> String;

    /// Run the check once.
    async fn check(&self) -> Result<(), ProbeError>;
}

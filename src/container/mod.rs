//! Docker container lifecycle for the dependent service.
//!
//! The workflow only needs three operations (create, start, stop), exposed
//! through the [`ContainerRuntime`] trait so tests can swap the daemon for a
//! recording double. [`DockerRuntime`] is the bollard-backed implementation.
//!
//! Image management and network configuration are out of scope: the image
//! must already be present locally (`docker pull` it first), and ports
//! are published exactly as the [`ContainerSpec`] lists them.

pub mod config;
pub mod daemon;
pub mod error;
pub mod runtime;

pub use config::{BindMount, ContainerSpec, Endpoint};
pub use daemon::{DaemonInfo, connect_hint, daemon_info};
pub use error::{ContainerError, Result};
pub use runtime::{ContainerRuntime, DockerRuntime, connect_docker};

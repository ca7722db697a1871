//! Container specification types.

use std::path::PathBuf;

/// Everything needed to create the dependent-service container.
///
/// Values are forwarded verbatim to the Docker Engine API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Container name.
    pub name: String,
    /// Docker image to run.
    pub image: String,
    /// Arguments passed to the image entrypoint.
    pub cmd: Vec<String>,
    /// Environment variables: (name, value).
    pub env: Vec<(String, String)>,
    /// Port mappings: (host_port, container_port).
    pub ports: Vec<(String, String)>,
    /// Bind mounts from the host.
    pub mounts: Vec<BindMount>,
    /// Let the daemon remove the container once it stops.
    pub auto_remove: bool,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: String::new(),
            cmd: Vec::new(),
            env: Vec::new(),
            ports: Vec::new(),
            mounts: Vec::new(),
            auto_remove: true,
        }
    }
}

impl ContainerSpec {
    /// Environment in the `KEY=value` form the Docker API expects.
    pub fn env_pairs(&self) -> Vec<String> {
        self.env.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
    }

    /// Get the primary endpoint for this container.
    /// Returns the first mapped port on the loopback host.
    /// Returns `None` if no ports are configured or port strings are not valid numbers.
    pub fn primary_endpoint(&self) -> Option<Endpoint> {
        let (host_port, container_port) = self.ports.first()?;
        let port = host_port.parse().ok()?;
        let container_port = container_port.parse().ok()?;
        Some(Endpoint {
            host: "127.0.0.1".to_string(),
            port,
            container_port,
        })
    }
}

/// A host directory bound into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    /// Absolute path on the host.
    pub source: PathBuf,
    /// Path inside the container.
    pub target: String,
    pub read_only: bool,
}

/// Represents a published container port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host address (usually 127.0.0.1).
    pub host: String,
    /// Port on the host.
    pub port: u16,
    /// Port inside the container.
    pub container_port: u16,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

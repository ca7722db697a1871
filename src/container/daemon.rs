//! Reachability report for the Docker daemon.

use bollard::Docker;

use crate::container::error::{ContainerError, Result};
use crate::container::runtime::connect_docker;

/// Version details of the daemon the runtime will talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonInfo {
    pub version: String,
    pub api_version: String,
    pub platform: String,
}

impl std::fmt::Display for DaemonInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Docker {} (API {}, {})",
            self.version, self.api_version, self.platform
        )
    }
}

/// Connect the same way [`crate::container::DockerRuntime`] does and ask for the version.
pub async fn daemon_info() -> Result<DaemonInfo> {
    let docker = connect_docker().await?;
    version_of(&docker).await
}

async fn version_of(docker: &Docker) -> Result<DaemonInfo> {
    let version = docker
        .version()
        .await
        .map_err(|e| ContainerError::DockerNotAvailable {
            reason: e.to_string(),
        })?;

    let unknown = || "unknown".to_string();
    let platform = match (version.os, version.arch) {
        (Some(os), Some(arch)) => format!("{}/{}", os, arch),
        (Some(os), None) => os,
        _ => unknown(),
    };

    Ok(DaemonInfo {
        version: version.version.unwrap_or_else(unknown),
        api_version: version.api_version.unwrap_or_else(unknown),
        platform,
    })
}

/// What to try next when the daemon could not be reached.
pub fn connect_hint(err: &ContainerError) -> &'static str {
    let reason = err.to_string().to_ascii_lowercase();
    if reason.contains("permission denied") {
        "The Docker socket is not accessible: add your user to the docker group"
    } else if reason.contains("no such file") || reason.contains("not found") {
        "No Docker socket found: install Docker, or set DOCKER_HOST"
    } else {
        "Is the Docker daemon running? Check with: docker info"
    }
}

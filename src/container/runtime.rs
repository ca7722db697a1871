//! Container lifecycle over the Docker Engine API.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::{HostConfig, Mount, MountTypeEnum, PortBinding};

use crate::container::config::ContainerSpec;
use crate::container::error::{ContainerError, Result};

/// The container lifecycle operations the workflow depends on.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create a container from the spec and return its ID.
    async fn create(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a created container.
    async fn start(&self, id: &str) -> Result<()>;

    /// Stop a running container, giving it `timeout` to exit before it is killed.
    async fn stop(&self, id: &str, timeout: Duration) -> Result<()>;
}

/// [`ContainerRuntime`] backed by a local Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the daemon and verify it answers a ping.
    pub async fn connect() -> Result<Self> {
        let docker = connect_docker().await?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn create(&self, spec: &ContainerSpec) -> Result<String> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            ..Default::default()
        };

        let response = self
            .docker
            .create_container(Some(options), create_config(spec))
            .await
            .map_err(|e| ContainerError::CreationFailed {
                name: spec.name.clone(),
                reason: e.to_string(),
            })?;

        for warning in &response.warnings {
            tracing::warn!("Docker warning for '{}': {}", spec.name, warning);
        }

        Ok(response.id)
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| ContainerError::StartFailed {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn stop(&self, id: &str, timeout: Duration) -> Result<()> {
        let options = StopContainerOptions {
            t: i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX),
        };

        match self.docker.stop_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            // 304: already stopped. 404: already removed by auto-remove.
            Err(BollardError::DockerResponseServerError {
                status_code: 304 | 404,
                message,
            }) => {
                tracing::debug!("Container {} already gone: {}", id, message);
                Ok(())
            }
            Err(e) => Err(ContainerError::StopFailed {
                id: id.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Build the create request for a spec.
pub(crate) fn create_config(spec: &ContainerSpec) -> Config<String> {
    let mut port_bindings = HashMap::new();
    for (host_port, container_port) in &spec.ports {
        port_bindings.insert(
            format!("{}/tcp", container_port),
            Some(vec![PortBinding {
                host_ip: None,
                host_port: Some(host_port.clone()),
            }]),
        );
    }

    // Exposed ports (bollard expects HashMap<String, HashMap<(), ()>>)
    let exposed_ports: HashMap<String, HashMap<(), ()>> = spec
        .ports
        .iter()
        .map(|(_, container_port)| (format!("{}/tcp", container_port), HashMap::new()))
        .collect();

    let mounts: Vec<Mount> = spec
        .mounts
        .iter()
        .map(|m| Mount {
            typ: Some(MountTypeEnum::BIND),
            source: Some(m.source.to_string_lossy().into_owned()),
            target: Some(m.target.clone()),
            read_only: Some(m.read_only),
            ..Default::default()
        })
        .collect();

    let env = spec.env_pairs();

    let host_config = HostConfig {
        port_bindings: Some(port_bindings),
        mounts: if mounts.is_empty() {
            None
        } else {
            Some(mounts)
        },
        auto_remove: Some(spec.auto_remove),
        ..Default::default()
    };

    Config {
        image: Some(spec.image.clone()),
        cmd: if spec.cmd.is_empty() {
            None
        } else {
            Some(spec.cmd.clone())
        },
        env: if env.is_empty() { None } else { Some(env) },
        exposed_ports: Some(exposed_ports),
        host_config: Some(host_config),
        ..Default::default()
    }
}

/// Connect to the Docker daemon.
///
/// Tries bollard's defaults first (which honor `DOCKER_HOST`), then the
/// per-user socket locations used by Docker Desktop and rootless Docker.
pub async fn connect_docker() -> Result<Docker> {
    let mut last_error = match Docker::connect_with_defaults() {
        Ok(docker) => match docker.ping().await {
            Ok(_) => return Ok(docker),
            Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
    };

    for socket in fallback_sockets() {
        if !socket.exists() {
            continue;
        }
        let path = socket.to_string_lossy();
        match Docker::connect_with_socket(&path, 120, bollard::API_DEFAULT_VERSION) {
            Ok(docker) => match docker.ping().await {
                Ok(_) => {
                    tracing::debug!("Connected to Docker via {}", path);
                    return Ok(docker);
                }
                Err(e) => last_error = format!("{}: {}", path, e),
            },
            Err(e) => last_error = format!("{}: {}", path, e),
        }
    }

    Err(ContainerError::DockerNotAvailable { reason: last_error })
}

fn fallback_sockets() -> Vec<PathBuf> {
    let mut sockets = Vec::new();
    if cfg!(unix) {
        if let Some(home) = dirs::home_dir() {
            sockets.push(home.join(".docker/run/docker.sock"));
        }
        if let Some(runtime_dir) = std::env::var_os("XDG_RUNTIME_DIR") {
            sockets.push(PathBuf::from(runtime_dir).join("docker.sock"));
        }
    }
    sockets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::config::BindMount;

    fn mysql_spec() -> ContainerSpec {
        ContainerSpec {
            name: "dockerup".to_string(),
            image: "mysql:8.0".to_string(),
            cmd: vec!["--default-authentication-plugin=mysql_native_password".to_string()],
            env: vec![("MYSQL_ROOT_PASSWORD".to_string(), "root".to_string())],
            ports: vec![("7706".to_string(), "3306".to_string())],
            mounts: vec![BindMount {
                source: PathBuf::from("/srv/app/schema"),
                target: "/docker-entrypoint-initdb.d".to_string(),
                read_only: true,
            }],
            auto_remove: true,
        }
    }

    #[test]
    fn test_create_config_ports() {
        let config = create_config(&mysql_spec());

        let exposed = config.exposed_ports.unwrap();
        assert!(exposed.contains_key("3306/tcp"));

        let host = config.host_config.unwrap();
        let bindings = host.port_bindings.unwrap();
        let binding = bindings["3306/tcp"].as_ref().unwrap();
        assert_eq!(binding[0].host_port.as_deref(), Some("7706"));
        assert_eq!(binding[0].host_ip, None);
    }

    #[test]
    fn test_create_config_mounts_and_auto_remove() {
        let config = create_config(&mysql_spec());
        let host = config.host_config.unwrap();

        assert_eq!(host.auto_remove, Some(true));
        let mounts = host.mounts.unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].typ, Some(MountTypeEnum::BIND));
        assert_eq!(mounts[0].source.as_deref(), Some("/srv/app/schema"));
        assert_eq!(
            mounts[0].target.as_deref(),
            Some("/docker-entrypoint-initdb.d")
        );
    }

    #[test]
    fn test_create_config_cmd_and_env() {
        let config = create_config(&mysql_spec());
        assert_eq!(config.image.as_deref(), Some("mysql:8.0"));
        assert_eq!(
            config.cmd.unwrap(),
            vec!["--default-authentication-plugin=mysql_native_password"]
        );
        assert_eq!(config.env.unwrap(), vec!["MYSQL_ROOT_PASSWORD=root"]);
    }

    #[test]
    fn test_create_config_omits_empty_lists() {
        let spec = ContainerSpec {
            name: "bare".to_string(),
            image: "alpine".to_string(),
            ..Default::default()
        };
        let config = create_config(&spec);
        assert!(config.cmd.is_none());
        assert!(config.env.is_none());
        assert!(config.host_config.unwrap().mounts.is_none());
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::file::ContainerSection;
use crate::config::helpers::{EnvSource, optional_env, parse_bool_env, parse_optional_env};
use crate::error::ConfigError;

/// Port MySQL listens on inside the container.
pub const MYSQL_CONTAINER_PORT: u16 = 3306;

/// Where the official MySQL image looks for init scripts.
pub const INIT_SCRIPTS_DIR: &str = "/docker-entrypoint-initdb.d";

/// Container configuration for the MySQL service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Image to run. Must already be available to the daemon.
    pub image: String,
    /// Container name.
    pub name: String,
    /// Arguments for the image entrypoint.
    pub cmd: Vec<String>,
    /// Host port published for MySQL.
    pub host_port: u16,
    /// Host directory mounted as the init scripts directory (absolute).
    pub schema_dir: PathBuf,
    /// Grace period given to the container on stop.
    pub stop_timeout: Duration,
    /// Leave the container running when the workflow fails after start.
    pub keep_on_failure: bool,
}

impl ContainerConfig {
    pub(crate) fn resolve(
        env: &dyn EnvSource,
        file: &ContainerSection,
        cwd: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let image = optional_env(env, "DOCKERUP_IMAGE")?
            .or_else(|| file.image.clone())
            .unwrap_or_else(|| "mysql:8.0".to_string());

        let name = optional_env(env, "DOCKERUP_CONTAINER_NAME")?
            .or_else(|| file.name.clone())
            .unwrap_or_else(|| "dockerup".to_string());

        let cmd = file.cmd.clone().unwrap_or_else(|| {
            vec!["--default-authentication-plugin=mysql_native_password".to_string()]
        });

        let host_port = parse_optional_env(
            env,
            "DOCKERUP_HOST_PORT",
            file.host_port.unwrap_or(7706),
        )?;
        if host_port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DOCKERUP_HOST_PORT".to_string(),
                message: "must be a non-zero port".to_string(),
            });
        }

        let schema_dir = optional_env(env, "DOCKERUP_SCHEMA_DIR")?
            .map(PathBuf::from)
            .or_else(|| file.schema_dir.clone())
            .unwrap_or_else(|| PathBuf::from("schema"));
        // Bind mount sources must be absolute.
        let schema_dir = if schema_dir.is_absolute() {
            schema_dir
        } else {
            let cwd = cwd.ok_or_else(|| ConfigError::MissingRequired {
                key: "DOCKERUP_SCHEMA_DIR".to_string(),
                hint: "the current directory is unavailable; set an absolute path".to_string(),
            })?;
            cwd.join(schema_dir)
        };

        let stop_timeout_secs = parse_optional_env(
            env,
            "DOCKERUP_STOP_TIMEOUT_SECS",
            file.stop_timeout_secs.unwrap_or(60),
        )?;

        let keep_on_failure = parse_bool_env(
            env,
            "DOCKERUP_KEEP_ON_FAILURE",
            file.keep_on_failure.unwrap_or(false),
        )?;

        Ok(Self {
            image,
            name,
            cmd,
            host_port,
            schema_dir,
            stop_timeout: Duration::from_secs(stop_timeout_secs),
            keep_on_failure,
        })
    }
}

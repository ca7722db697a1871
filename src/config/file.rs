//! Optional TOML configuration file.
//!
//! Every field is optional; values present here override the built-in
//! defaults and are themselves overridden by `DOCKERUP_*` environment
//! variables.
//!
//! ```toml
//! [container]
//! image = "mysql:8.0"
//! host_port = 7706
//! schema_dir = "schema"
//!
//! [database]
//! user = "root"
//! query_table = "dockerup"
//!
//! [readiness]
//! max_attempts = 10
//! interval_secs = 5
//! ```

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub container: ContainerSection,
    pub database: DatabaseSection,
    pub readiness: ReadinessSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerSection {
    pub image: Option<String>,
    pub name: Option<String>,
    pub cmd: Option<Vec<String>>,
    pub host_port: Option<u16>,
    pub schema_dir: Option<PathBuf>,
    pub stop_timeout_secs: Option<u64>,
    pub keep_on_failure: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub name: Option<String>,
    pub query_table: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessSection {
    pub max_attempts: Option<u32>,
    pub interval_secs: Option<u64>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&raw).map_err(|e| match e {
            ConfigError::File { reason, .. } => ConfigError::File {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse config file contents.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::File {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }
}

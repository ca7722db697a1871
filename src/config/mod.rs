//! Configuration for dockerup.
//!
//! Resolution order, lowest priority first: built-in defaults, the optional
//! TOML file, `DOCKERUP_*` environment variables (a `.env` file is loaded by
//! the binary before resolving), then CLI overrides via [`Config::apply`].

mod container;
mod database;
mod file;
mod helpers;
mod readiness;

use std::path::Path;

use secrecy::ExposeSecret;

use crate::container::{BindMount, ContainerSpec};
use crate::error::ConfigError;

pub use container::{ContainerConfig, INIT_SCRIPTS_DIR, MYSQL_CONTAINER_PORT};
pub use database::{DatabaseConfig, QueryConfig};
pub use file::FileConfig;
pub use helpers::{EnvSource, ProcessEnv};
pub use readiness::ReadinessConfig;

/// Main configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub container: ContainerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub readiness: ReadinessConfig,
}

/// Values given on the command line, applied last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub max_attempts: Option<u32>,
    pub interval_secs: Option<u64>,
    pub keep_on_failure: bool,
}

impl Config {
    /// Resolve from defaults, an optional config file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(&ProcessEnv, &file)
    }

    /// Resolve against an explicit variable source.
    pub fn resolve(env: &dyn EnvSource, file: &FileConfig) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().ok();
        let container = ContainerConfig::resolve(env, &file.container, cwd.as_deref())?;
        let database = DatabaseConfig::resolve(env, &file.database, container.host_port)?;
        let query = QueryConfig::resolve(env, &file.database)?;
        let readiness = ReadinessConfig::resolve(env, &file.readiness)?;

        Ok(Self {
            container,
            database,
            query,
            readiness,
        })
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(n) = overrides.max_attempts {
            self.readiness.max_attempts = n;
        }
        if let Some(secs) = overrides.interval_secs {
            self.readiness.interval_secs = secs;
        }
        if overrides.keep_on_failure {
            self.container.keep_on_failure = true;
        }
        self.readiness.validate()
    }

    /// The MySQL container as the Docker API should create it.
    ///
    /// The server is initialized with the configured credentials and schema
    /// so the session built from [`Config::database`] can log in.
    pub fn container_spec(&self) -> ContainerSpec {
        let db = &self.database;
        let password = db.password.expose_secret().to_string();

        let mut env = vec![
            ("MYSQL_ROOT_PASSWORD".to_string(), password.clone()),
            ("MYSQL_PASSWORD".to_string(), password),
            ("MYSQL_DATABASE".to_string(), db.name.clone()),
        ];
        // The image refuses MYSQL_USER=root; root is created from MYSQL_ROOT_PASSWORD.
        if db.user != "root" {
            env.push(("MYSQL_USER".to_string(), db.user.clone()));
        }

        ContainerSpec {
            name: self.container.name.clone(),
            image: self.container.image.clone(),
            cmd: self.container.cmd.clone(),
            env,
            ports: vec![(
                self.container.host_port.to_string(),
                MYSQL_CONTAINER_PORT.to_string(),
            )],
            mounts: vec![BindMount {
                source: self.container.schema_dir.clone(),
                target: INIT_SCRIPTS_DIR.to_string(),
                read_only: true,
            }],
            auto_remove: true,
        }
    }
}

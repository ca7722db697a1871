use std::time::Duration;

use secrecy::SecretString;

use crate::config::file::DatabaseSection;
use crate::config::helpers::{EnvSource, optional_env, parse_optional_env};
use crate::db::is_plain_identifier;
use crate::error::ConfigError;

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    /// Same as the container's published host port.
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    /// Schema created by the container and used for connections.
    pub name: String,
    /// Upper bound for opening one connection.
    pub connect_timeout: Duration,
}

/// What the workflow reads once the database is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Table whose first row's `id` is loaded.
    pub table: String,
}

impl DatabaseConfig {
    pub(crate) fn resolve(
        env: &dyn EnvSource,
        file: &DatabaseSection,
        port: u16,
    ) -> Result<Self, ConfigError> {
        let host = optional_env(env, "DOCKERUP_DB_HOST")?
            .or_else(|| file.host.clone())
            .unwrap_or_else(|| "localhost".to_string());

        let user = optional_env(env, "DOCKERUP_DB_USER")?
            .or_else(|| file.user.clone())
            .unwrap_or_else(|| "root".to_string());

        let password = optional_env(env, "DOCKERUP_DB_PASSWORD")?
            .map(SecretString::from)
            .or_else(|| file.password.clone())
            .unwrap_or_else(|| SecretString::from("root".to_string()));

        let name = optional_env(env, "DOCKERUP_DB_NAME")?
            .or_else(|| file.name.clone())
            .unwrap_or_else(|| "dockerup".to_string());
        if !is_plain_identifier(&name) {
            return Err(ConfigError::InvalidValue {
                key: "DOCKERUP_DB_NAME".to_string(),
                message: format!("'{}' is not a plain identifier", name),
            });
        }

        let connect_timeout_secs = parse_optional_env(
            env,
            "DOCKERUP_DB_CONNECT_TIMEOUT_SECS",
            file.connect_timeout_secs.unwrap_or(5),
        )?;
        if connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DOCKERUP_DB_CONNECT_TIMEOUT_SECS".to_string(),
                message: "must be at least 1 second".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            user,
            password,
            name,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }
}

impl QueryConfig {
    pub(crate) fn resolve(env: &dyn EnvSource, file: &DatabaseSection) -> Result<Self, ConfigError> {
        let table = optional_env(env, "DOCKERUP_QUERY_TABLE")?
            .or_else(|| file.query_table.clone())
            .unwrap_or_else(|| "dockerup".to_string());

        if !is_plain_identifier(&table) {
            return Err(ConfigError::InvalidValue {
                key: "DOCKERUP_QUERY_TABLE".to_string(),
                message: format!("'{}' is not a plain table identifier", table),
            });
        }

        Ok(Self { table })
    }
}

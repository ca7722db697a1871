//! MySQL session built on sqlx.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

use crate::config::DatabaseConfig;
use crate::db::{Database, is_plain_identifier};
use crate::error::{ProbeError, QueryError};
use crate::probe::Probe;

#[derive(Debug, sqlx::FromRow)]
struct StoredRow {
    id: i64,
}

/// Connection parameters for one MySQL database.
///
/// Opening a session does no network I/O. Each ping or query opens its own
/// short-lived connection, so a server that is still starting is simply
/// retried on the next call.
#[derive(Clone)]
pub struct MySqlSession {
    options: MySqlConnectOptions,
    target: String,
    connect_timeout: Duration,
}

impl MySqlSession {
    pub fn open(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose_secret())
            .database(&config.name);

        Self {
            options,
            target: format!(
                "mysql://{}@{}:{}/{}",
                config.user, config.host, config.port, config.name
            ),
            connect_timeout: config.connect_timeout,
        }
    }

    async fn connect(&self) -> Result<MySqlConnection, ProbeError> {
        match tokio::time::timeout(self.connect_timeout, self.options.connect()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(self.probe_error(e)),
            Err(_) => Err(ProbeError::Timeout {
                target: self.target.clone(),
                timeout: self.connect_timeout,
            }),
        }
    }

    fn probe_error(&self, e: sqlx::Error) -> ProbeError {
        match e {
            // The server answered; credentials or schema are wrong.
            sqlx::Error::Database(db) => ProbeError::Rejected {
                target: self.target.clone(),
                reason: db.to_string(),
            },
            other => ProbeError::Unreachable {
                target: self.target.clone(),
                reason: other.to_string(),
            },
        }
    }
}

impl std::fmt::Debug for MySqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSession")
            .field("target", &self.target)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::trace!("Closing MySQL connection failed: {}", e);
    }
}

#[async_trait]
impl Probe for MySqlSession {
    fn target(&self) -> String {
        self.target.clone()
    }

    async fn check(&self) -> Result<(), ProbeError> {
        let mut conn = self.connect().await?;
        let result = conn.ping().await.map_err(|e| self.probe_error(e));
        close(conn).await;
        result
    }
}

#[async_trait]
impl Database for MySqlSession {
    async fn load_first_id(&self, table: &str) -> Result<i64, QueryError> {
        if !is_plain_identifier(table) {
            return Err(QueryError::Failed {
                table: table.to_string(),
                reason: "not a plain table identifier".to_string(),
            });
        }

        let mut conn = self.connect().await.map_err(|e| QueryError::Failed {
            table: table.to_string(),
            reason: e.to_string(),
        })?;

        let sql = format!("SELECT CAST(id AS SIGNED) AS id FROM `{}` LIMIT 1", table);
        let row = sqlx::query_as::<_, StoredRow>(&sql)
            .fetch_optional(&mut conn)
            .await;
        close(conn).await;

        match row {
            Ok(Some(row)) => Ok(row.id),
            Ok(None) => Err(QueryError::NoRows {
                table: table.to_string(),
            }),
            Err(e) => Err(QueryError::Failed {
                table: table.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

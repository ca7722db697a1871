//! Database access for the dependent service.
//!
//! The workflow talks to the database through the [`Database`] trait: its
//! [`Probe`] supertrait is the readiness check, and one read query runs
//! once the service is up. [`MySqlSession`] implements it with sqlx.

pub mod mysql;

use async_trait::async_trait;

use crate::error::QueryError;
use crate::probe::Probe;

pub use mysql::MySqlSession;

/// Operations the workflow needs from the database.
///
/// [`Probe::check`] opens a connection and pings the server.
#[async_trait]
pub trait Database: Probe {
    /// Load the first row of `table` and return its `id` column.
    async fn load_first_id(&self, table: &str) -> Result<i64, QueryError>;
}

/// Whether `name` can be spliced into SQL as a table name.
///
/// Only ASCII letters, digits and underscores, not starting with a digit.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("dockerup"));
        assert!(is_plain_identifier("_t1"));
        assert!(is_plain_identifier("Users_2024"));

        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("1table"));
        assert!(!is_plain_identifier("users; DROP TABLE users"));
        assert!(!is_plain_identifier("db.table"));
        assert!(!is_plain_identifier("tbl`"));
        assert!(!is_plain_identifier(&"a".repeat(65)));
    }
}

//! End-to-end run against a real Docker daemon.
//!
//! Requires the `integration` feature, a running daemon, the MySQL image
//! pulled locally, and host port 17706 free:
//!
//! ```text
//! docker pull mysql:8.0
//! cargo test --features integration --test docker_e2e
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use dockerup::config::FileConfig;
use dockerup::container::DockerRuntime;
use dockerup::db::MySqlSession;
use dockerup::{Config, Workflow};

#[tokio::test]
async fn mysql_container_round_trip() {
    let schema_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schema");
    let env: HashMap<String, String> = [
        ("DOCKERUP_CONTAINER_NAME", "dockerup-e2e"),
        ("DOCKERUP_HOST_PORT", "17706"),
        ("DOCKERUP_DB_HOST", "127.0.0.1"),
        ("DOCKERUP_READY_MAX_ATTEMPTS", "30"),
        ("DOCKERUP_READY_INTERVAL_SECS", "2"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .chain([(
        "DOCKERUP_SCHEMA_DIR".to_string(),
        schema_dir.display().to_string(),
    )])
    .collect();

    let config = Config::resolve(&env, &FileConfig::default()).unwrap();
    let runtime = DockerRuntime::connect()
        .await
        .expect("Docker daemon must be running for integration tests");
    let database = MySqlSession::open(&config.database);

    let report = Workflow::new(Arc::new(runtime), Arc::new(database), config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.stored_id, 1);
    assert!(report.readiness.attempts >= 1);
}

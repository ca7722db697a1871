//! Workflow stage ordering and failure handling, with stub collaborators.
//!
//! Uses `StubRuntime` and `StubDatabase` from `dockerup::testing`; the tokio
//! clock is paused so readiness intervals elapse instantly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use dockerup::config::FileConfig;
use dockerup::testing::{FailAt, RuntimeCall, StubDatabase, StubRuntime};
use dockerup::{Config, QueryError, ReadinessError, Workflow, WorkflowError};

fn config() -> Config {
    Config::resolve(&HashMap::<String, String>::new(), &FileConfig::default())
        .expect("default config resolves")
}

fn full_lifecycle() -> Vec<RuntimeCall> {
    vec![
        RuntimeCall::Create {
            name: "dockerup".to_string(),
        },
        RuntimeCall::Start {
            id: "dockerup-id".to_string(),
        },
        RuntimeCall::Stop {
            id: "dockerup-id".to_string(),
            timeout: Duration::from_secs(60),
        },
    ]
}

#[tokio::test(start_paused = true)]
async fn happy_path_runs_every_stage_in_order() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::ready_after(3).with_stored_id(42));

    let report = Workflow::new(runtime.clone(), database.clone(), config())
        .run()
        .await
        .unwrap();

    assert_eq!(report.container_id, "dockerup-id");
    assert_eq!(report.stored_id, 42);
    assert_eq!(report.readiness.attempts, 4);
    assert_eq!(report.readiness.elapsed, Duration::from_secs(20));
    assert_eq!(runtime.calls(), full_lifecycle());
    assert_eq!(database.pings(), 4);
    assert_eq!(database.queries(), 1);
}

#[tokio::test(start_paused = true)]
async fn create_failure_is_setup_error() {
    let runtime = Arc::new(StubRuntime::failing_at(FailAt::Create));
    let database = Arc::new(StubDatabase::ready());

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Setup(_)));
    assert_eq!(err.stage(), "setup");
    assert_eq!(runtime.calls().len(), 1);
    assert_eq!(database.pings(), 0);
}

#[tokio::test(start_paused = true)]
async fn start_failure_is_setup_error() {
    let runtime = Arc::new(StubRuntime::failing_at(FailAt::Start));
    let database = Arc::new(StubDatabase::ready());

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Setup(_)));
    assert_eq!(runtime.calls(), full_lifecycle()[..2].to_vec());
    assert_eq!(database.pings(), 0);
}

#[tokio::test(start_paused = true)]
async fn exhausted_readiness_stops_container_and_skips_query() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::never_ready());

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .run()
        .await
        .unwrap_err();

    match err {
        WorkflowError::Readiness(ReadinessError::Exhausted { attempts, last }) => {
            assert_eq!(attempts, 10);
            assert!(last.to_string().contains("connection refused"));
        }
        other => panic!("expected readiness exhaustion, got {other:?}"),
    }
    assert_eq!(database.pings(), 10);
    assert_eq!(database.queries(), 0);
    // Best-effort cleanup still stops the container.
    assert_eq!(runtime.calls(), full_lifecycle());
}

#[tokio::test(start_paused = true)]
async fn keep_on_failure_leaves_container_running() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::never_ready());
    let mut config = config();
    config.container.keep_on_failure = true;
    config.readiness.max_attempts = 2;

    let err = Workflow::new(runtime.clone(), database.clone(), config)
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "readiness");
    assert_eq!(database.pings(), 2);
    assert_eq!(runtime.calls(), full_lifecycle()[..2].to_vec());
}

#[tokio::test(start_paused = true)]
async fn query_failure_is_reported_after_cleanup() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::ready().with_failing_query());

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Query(QueryError::Failed { .. })));
    assert_eq!(runtime.calls(), full_lifecycle());
}

#[tokio::test(start_paused = true)]
async fn empty_table_is_query_error() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::ready().with_empty_table());

    let err = Workflow::new(runtime, database, config())
        .run()
        .await
        .unwrap_err();

    match err {
        WorkflowError::Query(QueryError::NoRows { table }) => assert_eq!(table, "dockerup"),
        other => panic!("expected NoRows, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn stop_failure_after_success_is_teardown_error() {
    let runtime = Arc::new(StubRuntime::failing_at(FailAt::Stop));
    let database = Arc::new(StubDatabase::ready());

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Teardown(_)));
    // The workload itself completed.
    assert_eq!(database.queries(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_readiness_and_cleans_up() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::never_ready());
    let token = CancellationToken::new();

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        cancel.cancel();
    });

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .with_cancellation(token)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Readiness(ReadinessError::Cancelled { attempts: 1 })
    ));
    assert_eq!(database.pings(), 1);
    assert_eq!(runtime.calls(), full_lifecycle());
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_query_stops_container() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::ready().with_query_delay(Duration::from_secs(30)));
    let token = CancellationToken::new();

    // Ready at 5s; the query is still running at 12s.
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();
    });

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .with_cancellation(token)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Cancelled { stage: "query" }));
    assert_eq!(database.queries(), 1);
    assert_eq!(runtime.calls(), full_lifecycle());
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_create_touches_nothing() {
    let runtime = Arc::new(StubRuntime::new());
    let database = Arc::new(StubDatabase::ready());
    let token = CancellationToken::new();
    token.cancel();

    let err = Workflow::new(runtime.clone(), database.clone(), config())
        .with_cancellation(token)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Cancelled { stage: "setup" }));
    assert!(runtime.calls().is_empty());
    assert_eq!(database.pings(), 0);
}

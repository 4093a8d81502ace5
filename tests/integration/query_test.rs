//! Query execution integration tests.
//!
//! Tests SQL query execution and result handling through the executor.

use super::manager;
use icequery::connection::ConnectionState;
use icequery::engine::{CellValue, MockEngineFactory, RawResult};
use icequery::error::ConsoleError;
use icequery::query::{QueryExecutor, QueryOutcome};
use std::sync::Arc;
use tokio::sync::Notify;

async fn ready_executor(factory: MockEngineFactory) -> QueryExecutor {
    let (manager, _) = manager(factory);
    assert!(manager.initialize().await.is_ready());
    QueryExecutor::new(manager)
}

#[tokio::test]
async fn test_execute_simple_select() {
    let factory = MockEngineFactory::new().respond(
        "SELECT 1 AS num, 'hello' AS greeting",
        RawResult::new(
            vec!["num".into(), "greeting".into()],
            vec![vec![CellValue::Int(1), CellValue::Text("hello".into())]],
        ),
    );
    let executor = ready_executor(factory).await;

    let outcome = executor
        .execute("SELECT 1 AS num, 'hello' AS greeting;")
        .await
        .unwrap();
    let QueryOutcome::Success(result) = outcome else {
        panic!("expected success, got {outcome:?}");
    };

    assert_eq!(result.columns, vec!["num", "greeting"]);
    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0].get("num"), Some(&CellValue::Int(1)));
    assert_eq!(
        result.rows[0].get("greeting"),
        Some(&CellValue::Text("hello".into()))
    );
    assert!(result.execution_time_ms >= 0.0);
}

#[tokio::test]
async fn test_invalid_sql_keeps_connection_ready() {
    let (manager, probe) = manager(MockEngineFactory::demo());
    manager.initialize().await;
    let executor = QueryExecutor::new(Arc::clone(&manager));

    let outcome = executor.execute("SELEC * FROM nowhere").await.unwrap();
    assert_eq!(
        outcome,
        QueryOutcome::Failure("Parser Error: syntax error at or near \"SELEC\"".into())
    );
    assert!(matches!(manager.state(), ConnectionState::Ready(_)));

    let outcome = executor
        .execute("SELECT * FROM iceberg_catalog.analytics.events LIMIT 5")
        .await
        .unwrap();
    let QueryOutcome::Success(result) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(result.row_count, 5);
    assert_eq!(probe.queries(), 2);
    assert_eq!(probe.connections_opened(), 1);
}

#[tokio::test]
async fn test_duplicate_columns_are_kept_apart() {
    let factory = MockEngineFactory::new().respond(
        "SELECT 1 AS a, 2 AS a",
        RawResult::new(
            vec!["a".into(), "a".into()],
            vec![vec![CellValue::Int(1), CellValue::Int(2)]],
        ),
    );
    let executor = ready_executor(factory).await;

    let QueryOutcome::Success(result) = executor.execute("SELECT 1 AS a, 2 AS a").await.unwrap()
    else {
        panic!("expected success");
    };
    assert_eq!(result.columns, vec!["a", "a_1"]);
    assert_eq!(result.rows[0].get("a_1"), Some(&CellValue::Int(2)));
}

#[tokio::test]
async fn test_statement_without_rows() {
    let executor = ready_executor(MockEngineFactory::new()).await;
    let QueryOutcome::Success(result) = executor
        .execute("CREATE TABLE t (id INTEGER)")
        .await
        .unwrap()
    else {
        panic!("expected success");
    };
    assert_eq!(result.columns, vec!["Count"]);
    assert_eq!(result.rows[0].get("Count"), Some(&CellValue::Int(0)));
}

#[tokio::test]
async fn test_scripted_rejection_passes_through() {
    let message = "Catalog Error: Table with name missing does not exist!";
    let executor =
        ready_executor(MockEngineFactory::new().reject("SELECT * FROM missing", message)).await;

    let outcome = executor.execute("SELECT * FROM missing").await.unwrap();
    assert_eq!(outcome, QueryOutcome::Failure(message.into()));
}

#[tokio::test]
async fn test_second_executor_is_busy_while_query_pending() {
    let gate = Arc::new(Notify::new());
    let (manager, probe) = manager(MockEngineFactory::demo().gate_queries(gate.clone()));
    manager.initialize().await;

    let executors = [
        Arc::new(QueryExecutor::new(Arc::clone(&manager))),
        Arc::new(QueryExecutor::new(Arc::clone(&manager))),
    ];
    let handles: Vec<_> = executors
        .iter()
        .map(|executor| {
            let executor = Arc::clone(executor);
            tokio::spawn(async move { executor.execute("SELECT 1").await })
        })
        .collect();
    while probe.queries() == 0 {
        tokio::task::yield_now().await;
    }
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(probe.queries(), 1);

    gate.notify_one();
    let mut busy = 0;
    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(QueryOutcome::Success(_)) => succeeded += 1,
            Err(ConsoleError::Busy) => busy += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!((succeeded, busy), (1, 1));
    assert_eq!(probe.queries(), 1);
    assert!(!manager.is_leased());
}

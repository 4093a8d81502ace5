//! Connection lifecycle integration tests.

use super::manager;
use icequery::connection::ConnectionState;
use icequery::engine::MockEngineFactory;
use icequery::error::{ConsoleError, InitStep};
use icequery::query::QueryExecutor;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn test_setup_protocol_order() {
    let (manager, probe) = manager(MockEngineFactory::new());
    manager.initialize().await;

    assert_eq!(
        probe.statements(),
        vec![
            "INSTALL httpfs;",
            "LOAD httpfs;",
            "INSTALL iceberg;",
            "LOAD iceberg;",
            "SET s3_endpoint='s3.us-east-1.amazonaws.com';",
            "SET s3_access_key_id='AKIA0000';",
            "SET s3_secret_access_key='secret';",
            "SET s3_region='us-east-1';",
            "CREATE SECRET iceberg_secret (TYPE iceberg, TOKEN 'tok''en');",
            "ATTACH 'warehouse' AS iceberg_catalog (TYPE iceberg, SECRET iceberg_secret, \
             ENDPOINT 'https://catalog.example.com/iceberg');",
        ]
    );
}

#[tokio::test]
async fn test_ready_reports_catalog() {
    let (manager, _) = manager(MockEngineFactory::new());
    match manager.initialize().await {
        ConnectionState::Ready(info) => {
            assert_eq!(info.alias, "iceberg_catalog");
            assert_eq!(info.bucket, "warehouse");
            assert_eq!(info.engine, "mock");
        }
        other => panic!("expected ready, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_attach_blocks_queries_without_engine_contact() {
    let (manager, probe) = manager(
        MockEngineFactory::demo().fail_statement("ATTACH", "IO Error: Failed to attach catalog"),
    );

    let state = manager.initialize().await;
    let ConnectionState::Failed(err) = state else {
        panic!("expected failure, got {state:?}");
    };
    assert_eq!(err.step, InitStep::AttachCatalog);
    assert_eq!(err.message, "IO Error: Failed to attach catalog");
    // The secret registration before the attach still ran.
    assert!(probe
        .statements()
        .iter()
        .any(|s| s.starts_with("CREATE SECRET")));

    let executor = QueryExecutor::new(Arc::clone(&manager));
    let result = executor.execute("SELECT 1").await;
    assert!(matches!(result, Err(ConsoleError::NotReady)));
    assert_eq!(probe.queries(), 0);

    // Failure is terminal for this manager.
    assert!(matches!(manager.initialize().await, ConnectionState::Failed(_)));
    assert_eq!(probe.instantiated(), 1);
}

#[tokio::test]
async fn test_shutdown_after_ready_blocks_queries() {
    let (manager, probe) = manager(MockEngineFactory::demo());
    manager.initialize().await;
    manager.shutdown().await;

    assert_eq!(probe.connections_closed(), 1);
    assert_eq!(probe.engines_shutdown(), 1);

    let executor = QueryExecutor::new(Arc::clone(&manager));
    let result = executor.execute("SELECT 1").await;
    assert!(matches!(result, Err(ConsoleError::NotReady)));
    assert_eq!(probe.queries(), 0);
}

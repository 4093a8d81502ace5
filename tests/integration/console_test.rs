//! Console orchestration integration tests.

use super::manager;
use icequery::config::DEFAULT_QUERY;
use icequery::console::{Console, ConsoleView, ResultPane};
use icequery::engine::MockEngineFactory;
use icequery::grid::SortDirection;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn test_default_query_round_trip() {
    let (manager, _) = manager(MockEngineFactory::demo());
    let mut console = Console::new(manager, DEFAULT_QUERY);
    assert!(matches!(console.view(), ConsoleView::Initializing));

    console.mount().await;
    let ConsoleView::Ready { editor, pane } = console.view() else {
        panic!("console should be ready");
    };
    assert_eq!(editor.value(), DEFAULT_QUERY);
    assert!(matches!(pane, ResultPane::Idle));

    assert!(console.submit().await);
    let grid = console.pane().grid().expect("grid after success");
    assert_eq!(grid.row_count(), 100);
    assert_eq!(grid.page_label(), "Page 1 of 2");
    assert!(!console.editor().is_disabled());
}

#[tokio::test]
async fn test_error_then_recovery() {
    let (manager, _) = manager(MockEngineFactory::demo());
    let mut console = Console::new(manager, "SELEC 1");
    console.mount().await;

    console.submit().await;
    match console.pane() {
        ResultPane::Error(message) => {
            assert_eq!(message, "Parser Error: syntax error at or near \"SELEC\"")
        }
        other => panic!("expected error pane, got {other:?}"),
    }
    assert!(matches!(console.view(), ConsoleView::Ready { .. }));

    console
        .editor_mut()
        .set_value("SELECT * FROM iceberg_catalog.analytics.events LIMIT 60");
    console.submit().await;
    assert_eq!(console.pane().grid().map(|g| g.row_count()), Some(60));
}

#[tokio::test]
async fn test_sort_survives_rerun() {
    let (manager, _) = manager(MockEngineFactory::demo());
    let mut console = Console::new(manager, DEFAULT_QUERY);
    console.mount().await;
    console.submit().await;

    if let Some(grid) = console.grid_mut() {
        grid.toggle_sort("event_type");
        grid.next_page();
    }
    console.submit().await;

    let grid = console.pane().grid().expect("grid after rerun");
    assert_eq!(grid.direction_for("event_type"), Some(SortDirection::Ascending));
    assert_eq!(grid.page_index(), 0);
}

#[tokio::test]
async fn test_run_is_ignored_while_pending() {
    let gate = Arc::new(Notify::new());
    let (manager, probe) = manager(MockEngineFactory::demo().gate_queries(gate.clone()));
    let mut console = Console::new(manager, DEFAULT_QUERY);
    console.mount().await;

    let sql = console.begin_execution().expect("first run starts");
    assert!(console.is_executing());
    assert!(console.editor().is_disabled());
    assert!(console.begin_execution().is_none());

    let executor = Arc::clone(console.executor());
    let pending = tokio::spawn(async move { executor.execute(&sql).await });
    while probe.queries() == 0 {
        tokio::task::yield_now().await;
    }
    gate.notify_one();

    console.finish_execution(pending.await.unwrap());
    assert!(!console.is_executing());
    assert_eq!(probe.queries(), 1);
}

#[tokio::test]
async fn test_failed_initialization_disables_console() {
    let (manager, probe) =
        manager(MockEngineFactory::demo().fail_statement("CREATE SECRET", "Invalid token"));
    let mut console = Console::new(manager, DEFAULT_QUERY);
    console.mount().await;

    match console.view() {
        ConsoleView::Error { message } => assert_eq!(message, "Invalid token"),
        other => panic!("expected error view, got {other:?}"),
    }
    assert!(!console.submit().await);
    assert_eq!(probe.queries(), 0);
}

//! Result grid integration tests.
//!
//! Runs queries through the mock engine and drives the grid over the results.

use super::manager;
use icequery::engine::{CellValue, MockEngineFactory, RawResult};
use icequery::grid::{ResultGrid, SortDirection, PAGE_SIZE};
use icequery::query::{NormalizedResult, QueryExecutor, QueryOutcome};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn id_name_result() -> NormalizedResult {
    NormalizedResult::from_raw(
        RawResult::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![CellValue::Int(2), CellValue::Null],
                vec![CellValue::Int(1), CellValue::Text("a".into())],
            ],
        ),
        Duration::from_millis(1),
    )
}

fn ids(grid: &ResultGrid) -> Vec<CellValue> {
    grid.visible_rows()
        .iter()
        .map(|row| row.get("id").cloned().unwrap_or_default())
        .collect()
}

async fn demo_grid(sql: &str) -> ResultGrid {
    let (manager, _) = manager(MockEngineFactory::demo());
    manager.initialize().await;
    let executor = QueryExecutor::new(manager);
    match executor.execute(sql).await.unwrap() {
        QueryOutcome::Success(result) => ResultGrid::new(result),
        QueryOutcome::Failure(message) => panic!("query failed: {message}"),
    }
}

#[test]
fn test_sort_by_id_then_name() {
    let mut grid = ResultGrid::new(id_name_result());
    assert_eq!(ids(&grid), vec![CellValue::Int(2), CellValue::Int(1)]);

    grid.toggle_sort("id");
    assert_eq!(ids(&grid), vec![CellValue::Int(1), CellValue::Int(2)]);

    // A different column restarts at ascending, nulls last.
    grid.toggle_sort("name");
    assert_eq!(grid.direction_for("name"), Some(SortDirection::Ascending));
    assert_eq!(grid.direction_for("id"), None);
    let names: Vec<_> = grid
        .visible_rows()
        .iter()
        .map(|row| grid.cell(row, &grid.columns()[1]).text)
        .collect();
    assert_eq!(names, vec!["a", "NULL"]);
}

#[test]
fn test_toggle_cycle_returns_to_schema_order() {
    let mut grid = ResultGrid::new(id_name_result());
    grid.toggle_sort("id");
    grid.toggle_sort("id");
    assert_eq!(grid.direction_for("id"), Some(SortDirection::Descending));
    assert_eq!(ids(&grid), vec![CellValue::Int(2), CellValue::Int(1)]);

    grid.toggle_sort("id");
    assert_eq!(grid.direction_for("id"), None);
    assert_eq!(ids(&grid), vec![CellValue::Int(2), CellValue::Int(1)]);
}

#[tokio::test]
async fn test_pagination_over_demo_table() {
    let mut grid = demo_grid("SELECT * FROM iceberg_catalog.analytics.events").await;
    assert_eq!(grid.row_count(), 120);
    assert_eq!(grid.page_size(), PAGE_SIZE);
    assert_eq!(grid.page_count(), 3);

    grid.set_page_index(5);
    assert_eq!(grid.page_index(), 2);
    assert_eq!(grid.visible_rows().len(), 20);
    assert!(!grid.can_next_page());

    grid.next_page();
    assert_eq!(grid.page_index(), 2);

    grid.first_page();
    grid.previous_page();
    assert_eq!(grid.page_index(), 0);
    assert_eq!(grid.visible_rows().len(), 50);
    assert_eq!(grid.page_label(), "Page 1 of 3");
}

#[tokio::test]
async fn test_sort_resets_to_first_page() {
    let mut grid = demo_grid("SELECT * FROM iceberg_catalog.analytics.events").await;
    grid.last_page();
    grid.toggle_sort("user_id");
    assert_eq!(grid.page_index(), 0);

    // Null user ids land at the end ascending and the start descending.
    grid.last_page();
    let last = grid.visible_rows().last().and_then(|row| row.get("user_id").cloned());
    assert_eq!(last, Some(CellValue::Null));

    grid.toggle_sort("user_id");
    let first = grid.visible_rows().first().and_then(|row| row.get("user_id").cloned());
    assert_eq!(first, Some(CellValue::Null));
}

#[tokio::test]
async fn test_structured_cells_render_as_text() {
    let grid = demo_grid("SELECT * FROM iceberg_catalog.analytics.events LIMIT 1").await;
    let row = grid.visible_rows()[0];
    let column = grid
        .columns()
        .iter()
        .find(|c| c.id == "properties")
        .expect("properties column");
    let cell = grid.cell(row, column);
    assert!(cell.text.starts_with('{'));
    assert!(cell.text.contains("\"duration_ms\""));
}

//! DuckDB smoke tests.
//!
//! Uses an in-memory database without a catalog, so only the engine, result
//! normalization and the grid are exercised.

use icequery::engine::{CellValue, DuckDbFactory, EngineFactory};
use icequery::grid::ResultGrid;
use icequery::query::NormalizedResult;
use std::time::Duration;

#[tokio::test]
async fn test_series_through_grid() {
    let engine = DuckDbFactory::new().instantiate().await.unwrap();
    let conn = engine.connect().await.unwrap();

    let raw = conn
        .query(
            "SELECT i AS id, CASE WHEN i % 10 = 0 THEN NULL ELSE i * 2 END AS doubled \
             FROM range(1, 121) t(i)",
        )
        .await
        .unwrap();
    let result = NormalizedResult::from_raw(raw, Duration::from_millis(1));
    assert_eq!(result.row_count, 120);

    let mut grid = ResultGrid::new(result);
    assert_eq!(grid.page_count(), 3);

    grid.toggle_sort("doubled");
    grid.toggle_sort("doubled");
    let first = grid.visible_rows()[0].get("doubled").cloned();
    assert_eq!(first, Some(CellValue::Null));

    conn.close().await.unwrap();
    engine.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_structured_values() {
    let engine = DuckDbFactory::new().instantiate().await.unwrap();
    let conn = engine.connect().await.unwrap();

    let raw = conn
        .query("SELECT {'page': '/docs', 'ms': 12} AS props, [1, 2] AS tags")
        .await
        .unwrap();
    let result = NormalizedResult::from_raw(raw, Duration::ZERO);
    let grid = ResultGrid::new(result);
    let row = grid.visible_rows()[0];

    assert_eq!(
        grid.cell(row, &grid.columns()[0]).text,
        r#"{"page":"/docs","ms":12}"#
    );
    assert_eq!(grid.cell(row, &grid.columns()[1]).text, "[1,2]");

    conn.close().await.unwrap();
    engine.shutdown().await.unwrap();
}

//! Embedded DuckDB engine implementation.
//!
//! The duckdb binding is blocking, so every call runs on a
//! `spawn_blocking` thread and is awaited by the caller.

use super::{CellValue, Engine, EngineConnection, EngineFactory, RawResult};
use crate::error::{ConsoleError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Days between 0001-01-01 and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

type Slot = Arc<Mutex<Option<Connection>>>;

/// Factory for in-memory DuckDB databases.
#[derive(Debug, Default)]
pub struct DuckDbFactory;

impl DuckDbFactory {
    /// Creates a new factory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EngineFactory for DuckDbFactory {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    async fn instantiate(&self) -> Result<Box<dyn Engine>> {
        let root = tokio::task::spawn_blocking(Connection::open_in_memory)
            .await
            .map_err(join_error)?
            .map_err(engine_error)?;

        debug!("Opened in-memory DuckDB database");
        Ok(Box::new(DuckDbEngine {
            root: Arc::new(Mutex::new(Some(root))),
        }))
    }
}

/// A DuckDB database, held open by its root connection.
struct DuckDbEngine {
    root: Slot,
}

#[async_trait]
impl Engine for DuckDbEngine {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>> {
        let conn = with_connection(&self.root, |root| root.try_clone()).await?;
        Ok(Box::new(DuckDbConnection {
            conn: Arc::new(Mutex::new(Some(conn))),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        release(&self.root).await
    }
}

/// A session on a DuckDB database.
struct DuckDbConnection {
    conn: Slot,
}

#[async_trait]
impl EngineConnection for DuckDbConnection {
    async fn execute_batch(&self, sql: &str) -> Result<()> {
        let sql = sql.to_string();
        with_connection(&self.conn, move |conn| conn.execute_batch(&sql)).await
    }

    async fn query(&self, sql: &str) -> Result<RawResult> {
        let sql = sql.to_string();
        with_connection(&self.conn, move |conn| run_query(conn, &sql)).await
    }

    async fn close(&self) -> Result<()> {
        release(&self.conn).await
    }
}

/// Runs a blocking operation against the connection in the slot.
async fn with_connection<T, F>(slot: &Slot, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> duckdb::Result<T> + Send + 'static,
{
    let slot = Arc::clone(slot);
    tokio::task::spawn_blocking(move || {
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard
            .as_ref()
            .ok_or_else(|| ConsoleError::engine("Connection already closed"))?;
        op(conn).map_err(engine_error)
    })
    .await
    .map_err(join_error)?
}

/// Drops the connection in the slot on a blocking thread.
async fn release(slot: &Slot) -> Result<()> {
    let slot = Arc::clone(slot);
    tokio::task::spawn_blocking(move || {
        let conn = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(conn);
    })
    .await
    .map_err(join_error)
}

fn run_query(conn: &Connection, sql: &str) -> duckdb::Result<RawResult> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(duckdb::params![])?;
    let schema = rows
        .as_ref()
        .map(|stmt| stmt.column_names())
        .unwrap_or_default();

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(schema.len());
        for idx in 0..schema.len() {
            let value: Value = row.get(idx)?;
            values.push(convert_value(value));
        }
        out.push(values);
    }

    Ok(RawResult::new(schema, out))
}

/// Converts a DuckDB value into a [`CellValue`].
fn convert_value(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Boolean(b) => CellValue::Bool(b),
        Value::TinyInt(v) => CellValue::Int(i64::from(v)),
        Value::SmallInt(v) => CellValue::Int(i64::from(v)),
        Value::Int(v) => CellValue::Int(i64::from(v)),
        Value::BigInt(v) => CellValue::Int(v),
        Value::HugeInt(v) => CellValue::HugeInt(v),
        Value::UTinyInt(v) => CellValue::UInt(u64::from(v)),
        Value::USmallInt(v) => CellValue::UInt(u64::from(v)),
        Value::UInt(v) => CellValue::UInt(u64::from(v)),
        Value::UBigInt(v) => CellValue::UInt(v),
        Value::Float(v) => CellValue::Float(f64::from(v)),
        Value::Double(v) => CellValue::Float(v),
        Value::Decimal(d) => CellValue::Decimal(d.to_string()),
        Value::Timestamp(unit, v) => convert_timestamp(unit, v),
        Value::Text(s) | Value::Enum(s) => CellValue::Text(s),
        Value::Blob(b) => CellValue::Bytes(b),
        Value::Date32(days) => convert_date(days),
        Value::Time64(unit, v) => convert_time(unit, v),
        Value::Interval {
            months,
            days,
            nanos,
        } => CellValue::Interval {
            months,
            days,
            nanos,
        },
        Value::List(items) | Value::Array(items) => {
            CellValue::List(items.into_iter().map(convert_value).collect())
        }
        Value::Struct(fields) => CellValue::Struct(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), convert_value(value.clone())))
                .collect(),
        ),
        Value::Map(entries) => CellValue::Map(
            entries
                .iter()
                .map(|(key, value)| (convert_value(key.clone()), convert_value(value.clone())))
                .collect(),
        ),
        Value::Union(inner) => convert_value(*inner),
        #[allow(unreachable_patterns)]
        other => CellValue::Text(format!("{other:?}")),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn convert_timestamp(unit: TimeUnit, value: i64) -> CellValue {
    DateTime::from_timestamp_micros(to_micros(unit, value))
        .map(|dt| CellValue::Timestamp(dt.naive_utc()))
        .unwrap_or(CellValue::Int(value))
}

fn convert_date(days: i32) -> CellValue {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(CellValue::Date)
        .unwrap_or(CellValue::Int(i64::from(days)))
}

fn convert_time(unit: TimeUnit, value: i64) -> CellValue {
    let micros = to_micros(unit, value);
    let secs = u32::try_from(micros.div_euclid(1_000_000)).ok();
    let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).ok();
    secs.zip(nanos)
        .and_then(|(secs, nanos)| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
        .map(CellValue::Time)
        .unwrap_or(CellValue::Int(value))
}

fn engine_error(err: duckdb::Error) -> ConsoleError {
    ConsoleError::engine(err.to_string())
}

fn join_error(err: tokio::task::JoinError) -> ConsoleError {
    ConsoleError::internal(format!("Engine task failed: {err}"))
}

//! Engine-independent result structure.

use std::collections::HashSet;
use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::engine::{CellValue, RawResult};

/// One row, mapping column names to values in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, CellValue)>,
}

impl Row {
    /// Creates a row from ordered entries.
    pub fn new(entries: Vec<(String, CellValue)>) -> Self {
        Self { entries }
    }

    /// Looks a value up by column name.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the value in the given column position.
    pub fn value_at(&self, index: usize) -> Option<&CellValue> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of a successful query, normalized for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    /// Unique column names in schema order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    /// Wall-clock time the engine took, in milliseconds.
    pub execution_time_ms: f64,
}

impl NormalizedResult {
    /// Materializes a raw engine result into row mappings.
    ///
    /// Repeated column names get `_1`, `_2`, ... suffixes so every row keeps
    /// one entry per column. Short rows are padded with NULL.
    pub fn from_raw(raw: RawResult, elapsed: Duration) -> Self {
        let columns = unique_columns(raw.schema);

        let rows: Vec<Row> = raw
            .rows
            .into_iter()
            .map(|values| {
                let mut values = values.into_iter();
                Row::new(
                    columns
                        .iter()
                        .map(|name| (name.clone(), values.next().unwrap_or(CellValue::Null)))
                        .collect(),
                )
            })
            .collect();

        Self {
            columns,
            row_count: rows.len(),
            rows,
            execution_time_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Formats the timing summary, e.g. `3 rows in 1.50ms`.
    pub fn summary(&self) -> String {
        let noun = if self.row_count == 1 { "row" } else { "rows" };
        format!(
            "{} {noun} in {:.2}ms",
            self.row_count, self.execution_time_ms
        )
    }
}

fn unique_columns(schema: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = schema.iter().cloned().collect();
    let mut taken: HashSet<String> = HashSet::new();

    schema
        .into_iter()
        .map(|name| {
            if taken.insert(name.clone()) {
                return name;
            }
            let mut suffix = 1;
            loop {
                let candidate = format!("{name}_{suffix}");
                if !seen.contains(&candidate) && taken.insert(candidate.clone()) {
                    seen.insert(candidate.clone());
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

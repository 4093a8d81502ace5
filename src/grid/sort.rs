//! Sort state and cell ordering for the result grid.

use std::cmp::Ordering;

use crate::engine::CellValue;
use crate::query::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Header indicator, e.g. ` ↑`.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Ascending => " ↑",
            Self::Descending => " ↓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

/// Active sort keys. At most one key is ever active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    /// Cycles the sort on `column`: asc, then desc, then unsorted.
    ///
    /// Toggling a different column replaces the key with ascending.
    pub fn toggle(&mut self, column: &str) {
        let next = match self.keys.first() {
            Some(key) if key.column == column => match key.direction {
                SortDirection::Ascending => Some(SortDirection::Descending),
                SortDirection::Descending => None,
            },
            _ => Some(SortDirection::Ascending),
        };

        self.keys.clear();
        if let Some(direction) = next {
            self.keys.push(SortKey {
                column: column.to_string(),
                direction,
            });
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn active(&self) -> Option<&SortKey> {
        self.keys.first()
    }

    /// Direction applied to `column`, if it is the sort key.
    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        self.active()
            .filter(|key| key.column == column)
            .map(|key| key.direction)
    }
}

static MISSING: CellValue = CellValue::Null;

/// Returns row indices in display order for the given key.
///
/// The sort is stable, so rows that compare equal keep their original order.
pub fn sorted_indices(rows: &[Row], key: Option<&SortKey>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    let Some(key) = key else {
        return order;
    };

    let value = |index: usize| rows[index].get(&key.column).unwrap_or(&MISSING);
    order.sort_by(|&a, &b| match key.direction {
        SortDirection::Ascending => compare_cells(value(a), value(b)),
        SortDirection::Descending => compare_cells(value(b), value(a)),
    });
    order
}

/// Ascending order over cells: NULL sorts after every value.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Null, CellValue::Null) => Ordering::Equal,
        (CellValue::Null, _) => Ordering::Greater,
        (_, CellValue::Null) => Ordering::Less,
        _ => {
            let (rank_a, rank_b) = (rank(a), rank(b));
            if rank_a == rank_b {
                compare_same_rank(a, b)
            } else {
                rank_a.cmp(&rank_b)
            }
        }
    }
}

/// Groups values that are mutually comparable.
fn rank(value: &CellValue) -> u8 {
    match value {
        CellValue::Null => u8::MAX,
        CellValue::Bool(_) => 0,
        CellValue::Int(_)
        | CellValue::UInt(_)
        | CellValue::HugeInt(_)
        | CellValue::Float(_)
        | CellValue::Decimal(_) => 1,
        CellValue::Text(_) => 2,
        CellValue::Date(_) | CellValue::Timestamp(_) => 3,
        CellValue::Time(_) => 4,
        CellValue::Interval { .. } => 5,
        CellValue::Bytes(_) | CellValue::List(_) | CellValue::Struct(_) | CellValue::Map(_) => 6,
    }
}

fn compare_same_rank(a: &CellValue, b: &CellValue) -> Ordering {
    use CellValue::*;

    match (a, b) {
        (Bool(x), Bool(y)) => x.cmp(y),
        (Text(x), Text(y)) => x.cmp(y),
        (Time(x), Time(y)) => x.cmp(y),
        (
            Interval {
                months: m1,
                days: d1,
                nanos: n1,
            },
            Interval {
                months: m2,
                days: d2,
                nanos: n2,
            },
        ) => (m1, d1, n1).cmp(&(m2, d2, n2)),
        (Date(_) | Timestamp(_), Date(_) | Timestamp(_)) => as_datetime(a).cmp(&as_datetime(b)),
        _ if rank(a) == 1 => compare_numbers(a, b),
        _ => a.serialized().cmp(&b.serialized()),
    }
}

fn compare_numbers(a: &CellValue, b: &CellValue) -> Ordering {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    }
}

fn as_integer(value: &CellValue) -> Option<i128> {
    match value {
        CellValue::Int(i) => Some(i128::from(*i)),
        CellValue::UInt(u) => Some(i128::from(*u)),
        CellValue::HugeInt(h) => Some(*h),
        _ => None,
    }
}

fn as_datetime(value: &CellValue) -> Option<chrono::NaiveDateTime> {
    match value {
        CellValue::Timestamp(ts) => Some(*ts),
        CellValue::Date(d) => Some(d.and_time(chrono::NaiveTime::MIN)),
        _ => None,
    }
}

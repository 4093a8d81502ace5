//! Value types returned by the query engine.
//!
//! Every cell the engine hands back is converted into the closed
//! [`CellValue`] union so formatting and sorting can match exhaustively.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// Result of a query as reported by the engine, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResult {
    /// Field names in schema order.
    pub schema: Vec<String>,
    /// Rows of data, one value per schema field.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawResult {
    /// Creates a raw result with the given schema and rows.
    pub fn new(schema: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { schema, rows }
    }
}

/// A single value from a query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// SQL NULL.
    #[default]
    Null,
    Bool(bool),
    /// Signed integers up to 64 bits.
    Int(i64),
    /// Unsigned 64-bit integers.
    UInt(u64),
    /// 128-bit integers (HUGEINT).
    HugeInt(i128),
    Float(f64),
    /// Fixed-point decimal, kept in its textual form to avoid rounding.
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Calendar interval.
    Interval { months: i32, days: i32, nanos: i64 },
    /// Binary data.
    Bytes(Vec<u8>),
    /// LIST or ARRAY value.
    List(Vec<CellValue>),
    /// STRUCT value with fields in declaration order.
    Struct(Vec<(String, CellValue)>),
    /// MAP value with entries in engine order.
    Map(Vec<(CellValue, CellValue)>),
}

impl CellValue {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns true for nested values (records, sequences, maps and binary).
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            CellValue::Bytes(_) | CellValue::List(_) | CellValue::Struct(_) | CellValue::Map(_)
        )
    }

    /// Returns the value as a float, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::UInt(u) => Some(*u as f64),
            CellValue::HugeInt(h) => Some(*h as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Decimal(d) => d.parse().ok(),
            _ => None,
        }
    }

    /// Converts the value into JSON.
    ///
    /// Nested values keep their field order; temporal and wide numeric values
    /// become strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            CellValue::Null => Json::Null,
            CellValue::Bool(b) => Json::Bool(*b),
            CellValue::Int(i) => Json::from(*i),
            CellValue::UInt(u) => Json::from(*u),
            CellValue::HugeInt(h) => match i64::try_from(*h) {
                Ok(i) => Json::from(i),
                Err(_) => Json::String(h.to_string()),
            },
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(f.to_string())),
            CellValue::Decimal(d) => Json::String(d.clone()),
            CellValue::Text(s) => Json::String(s.clone()),
            CellValue::Bytes(bytes) => Json::String(escape_bytes(bytes)),
            CellValue::List(items) => Json::Array(items.iter().map(CellValue::to_json).collect()),
            CellValue::Struct(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            CellValue::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_json()))
                    .collect(),
            ),
            CellValue::Date(_)
            | CellValue::Time(_)
            | CellValue::Timestamp(_)
            | CellValue::Interval { .. } => Json::String(self.to_string()),
        }
    }

    /// Returns the canonical serialized text of the value (compact JSON).
    pub fn serialized(&self) -> String {
        self.to_json().to_string()
    }
}

/// Renders binary data as `\xNN` escapes, the way DuckDB prints BLOBs.
pub fn escape_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\x{b:02X}")).collect()
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::UInt(u) => write!(f, "{u}"),
            CellValue::HugeInt(h) => write!(f, "{h}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Decimal(d) => f.write_str(d),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            CellValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            CellValue::Interval {
                months,
                days,
                nanos,
            } => write!(f, "{months} months {days} days {nanos} ns"),
            CellValue::Bytes(_)
            | CellValue::List(_)
            | CellValue::Struct(_)
            | CellValue::Map(_) => f.write_str(&self.serialized()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

// Conversion implementations for common types
impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(i64::from(v))
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Timestamp(v)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => CellValue::Null,
        }
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(v: Vec<u8>) -> Self {
        CellValue::Bytes(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Float(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Decimal("10.50".into()).to_string(), "10.50");
        assert_eq!(CellValue::from("hello").to_string(), "hello");
    }

    #[test]
    fn test_temporal_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2024-03-09");

        let ts = date.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(CellValue::Timestamp(ts).to_string(), "2024-03-09 13:05:00");
    }

    #[test]
    fn test_struct_serialization_keeps_field_order() {
        let value = CellValue::Struct(vec![
            ("zeta".to_string(), CellValue::Int(1)),
            ("alpha".to_string(), CellValue::List(vec![CellValue::Null, "x".into()])),
        ]);
        assert_eq!(value.serialized(), r#"{"zeta":1,"alpha":[null,"x"]}"#);
    }

    #[test]
    fn test_bytes_serialization() {
        let value = CellValue::Bytes(vec![0x01, 0xAB]);
        assert_eq!(value.serialized(), r#""\\x01\\xAB""#);
        assert_eq!(escape_bytes(&[0x01, 0xAB]), "\\x01\\xAB");
    }

    #[test]
    fn test_wide_integers_to_json() {
        assert_eq!(CellValue::HugeInt(7).to_json(), serde_json::json!(7));
        let huge = i128::from(i64::MAX) + 1;
        assert_eq!(
            CellValue::HugeInt(huge).to_json(),
            serde_json::json!("9223372036854775808")
        );
    }

    #[test]
    fn test_non_finite_float_to_json() {
        assert_eq!(CellValue::Float(f64::NAN).to_json(), serde_json::json!("NaN"));
    }

    #[test]
    fn test_is_structured() {
        assert!(CellValue::List(vec![]).is_structured());
        assert!(CellValue::Bytes(vec![]).is_structured());
        assert!(!CellValue::Text("[]".into()).is_structured());
        assert!(!CellValue::Null.is_structured());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(CellValue::from(42i32), CellValue::Int(42));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some("a")), CellValue::Text("a".into()));
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(CellValue::Decimal("1.25".into()).as_f64(), Some(1.25));
        assert_eq!(CellValue::UInt(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Text("3".into()).as_f64(), None);
    }
}

//! Cell formatting for result display.

use crate::engine::CellValue;

/// Marker shown for SQL NULL.
pub const NULL_MARKER: &str = "NULL";

/// How a formatted cell should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// No value; renderers dim it so it never reads as text.
    Null,
    /// Serialized record, sequence, map or binary value.
    Structured,
    Scalar,
}

/// Display form of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDisplay {
    pub text: String,
    pub kind: CellKind,
}

impl CellDisplay {
    pub fn is_null(&self) -> bool {
        self.kind == CellKind::Null
    }
}

/// Formats a cell value for display.
pub fn format_cell(value: &CellValue) -> CellDisplay {
    if value.is_null() {
        CellDisplay {
            text: NULL_MARKER.to_string(),
            kind: CellKind::Null,
        }
    } else if value.is_structured() {
        CellDisplay {
            text: value.serialized(),
            kind: CellKind::Structured,
        }
    } else {
        CellDisplay {
            text: value.to_string(),
            kind: CellKind::Scalar,
        }
    }
}

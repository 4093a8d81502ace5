//! Client-side result grid: sorting, pagination and cell formatting.

pub mod format;
pub mod model;
pub mod sort;

pub use format::{format_cell, CellDisplay, CellKind, NULL_MARKER};
pub use model::{ColumnDef, ResultGrid, PAGE_SIZE};
pub use sort::{compare_cells, SortDirection, SortKey, SortState};

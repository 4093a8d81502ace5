//! Sortable, paginated view over a normalized result.
//!
//! The grid never mutates the result it holds. Sorting produces a row order,
//! and pagination slices that order into pages of [`PAGE_SIZE`] rows.

use super::format::{format_cell, CellDisplay};
use super::sort::{sorted_indices, SortDirection, SortState};
use crate::engine::CellValue;
use crate::query::{NormalizedResult, Row};

/// Rows per page.
pub const PAGE_SIZE: usize = 50;

/// One column of the grid, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column id used for sorting; equal to the result column name.
    pub id: String,
    pub header: String,
}

/// Sort and pagination state over one normalized result.
#[derive(Debug, Clone)]
pub struct ResultGrid {
    result: NormalizedResult,
    columns: Vec<ColumnDef>,
    sort: SortState,
    order: Vec<usize>,
    page_index: usize,
}

impl ResultGrid {
    /// Creates a grid showing the first page, unsorted.
    pub fn new(result: NormalizedResult) -> Self {
        let columns = result
            .columns
            .iter()
            .map(|name| ColumnDef {
                id: name.clone(),
                header: name.clone(),
            })
            .collect();
        let order = (0..result.rows.len()).collect();

        Self {
            result,
            columns,
            sort: SortState::default(),
            order,
            page_index: 0,
        }
    }

    /// Creates a grid that applies `sort` if its column exists in the result.
    pub fn with_sort(result: NormalizedResult, sort: SortState) -> Self {
        let mut grid = Self::new(result);
        if let Some(key) = sort.active() {
            if grid.columns.iter().any(|c| c.id == key.column) {
                grid.sort = sort;
                grid.resort();
            }
        }
        grid
    }

    /// Replaces the result, keeping the current sort key if the column still
    /// exists, and returns to the first page.
    pub fn load(&mut self, result: NormalizedResult) {
        let sort = std::mem::take(&mut self.sort);
        *self = Self::with_sort(result, sort);
    }

    pub fn result(&self) -> &NormalizedResult {
        &self.result
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn row_count(&self) -> usize {
        self.result.row_count
    }

    /// Toggles the sort on a column and returns to the first page.
    ///
    /// Unknown column ids are ignored.
    pub fn toggle_sort(&mut self, column_id: &str) {
        if !self.columns.iter().any(|c| c.id == column_id) {
            return;
        }
        self.sort.toggle(column_id);
        self.resort();
    }

    /// Drops the sort key and returns to the first page.
    pub fn clear_sort(&mut self) {
        self.sort.clear();
        self.resort();
    }

    fn resort(&mut self) {
        self.order = sorted_indices(&self.result.rows, self.sort.active());
        self.page_index = 0;
    }

    /// Header text with the sort indicator, e.g. `id ↑`.
    pub fn header_label(&self, column: &ColumnDef) -> String {
        match self.sort.direction_for(&column.id) {
            Some(direction) => format!("{}{}", column.header, direction.indicator()),
            None => column.header.clone(),
        }
    }

    pub fn direction_for(&self, column_id: &str) -> Option<SortDirection> {
        self.sort.direction_for(column_id)
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        PAGE_SIZE
    }

    /// Number of pages; zero for an empty result.
    pub fn page_count(&self) -> usize {
        self.row_count().div_ceil(PAGE_SIZE)
    }

    /// Highest valid page index.
    fn last_page_index(&self) -> usize {
        self.page_count().saturating_sub(1)
    }

    /// Moves to the given page, clamping to the last page.
    pub fn set_page_index(&mut self, index: usize) {
        self.page_index = index.min(self.last_page_index());
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index < self.last_page_index()
    }

    /// Moves forward one page; a no-op on the last page.
    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.page_index += 1;
        }
    }

    /// Moves back one page; a no-op on the first page.
    pub fn previous_page(&mut self) {
        if self.can_previous_page() {
            self.page_index -= 1;
        }
    }

    pub fn first_page(&mut self) {
        self.page_index = 0;
    }

    pub fn last_page(&mut self) {
        self.page_index = self.last_page_index();
    }

    /// `Page k of n`, with at least one page shown.
    pub fn page_label(&self) -> String {
        format!(
            "Page {} of {}",
            self.page_index + 1,
            self.page_count().max(1)
        )
    }

    /// Rows on the current page, in display order.
    pub fn visible_rows(&self) -> Vec<&Row> {
        let start = self.page_index * PAGE_SIZE;
        self.order
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|&index| &self.result.rows[index])
            .collect()
    }

    /// Formats one cell of a row for display.
    pub fn cell(&self, row: &Row, column: &ColumnDef) -> CellDisplay {
        format_cell(row.get(&column.id).unwrap_or(&CellValue::Null))
    }
}

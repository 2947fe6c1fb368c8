//! Locating data inside loosely structured sheets.
//!
//! - [`header`] guesses how many leading rows are titles
//! - [`extent`] counts data rows, tolerating single blank rows
//! - [`columns`] binds configured properties to concrete columns
//!
//! The results are per file and never written back into the configuration.

pub mod columns;
pub mod extent;
pub mod header;

pub use columns::{find_header, resolve_column, ColumnBindings, ColumnRef};
pub use extent::{detect_data_extent, DataExtent};
pub use header::{check_header_rows, detect_header_rows, HEADER_SCAN_ROWS, PROXY_MARKER};

/// The addressable region of one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub header_rows: usize,
    pub data_rows: usize,
    pub gaps: usize,
}

impl SheetLayout {
    pub fn new(header_rows: usize, extent: DataExtent) -> Self {
        Self {
            header_rows,
            data_rows: extent.data_rows,
            gaps: extent.gaps,
        }
    }

    /// Zero-based index of the row holding column titles.
    pub fn title_row(&self) -> usize {
        self.header_rows.saturating_sub(1)
    }

    /// Zero-based grid row of the `offset`-th data row.
    ///
    /// Gaps are assumed to sit between the headers and the data.
    pub fn grid_row(&self, offset: usize) -> usize {
        self.header_rows + self.gaps + offset
    }

    /// 1-based sheet row number of the `offset`-th data row, as shown in
    /// spreadsheet applications.
    pub fn sheet_row(&self, offset: usize) -> usize {
        self.grid_row(offset) + 1
    }
}

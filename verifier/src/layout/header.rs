//! Header row detection.

use tracing::debug;

use crate::report::{CheckKind, Diagnostic};
use crate::sheet::{CellValue, GridSource};

/// Text in column A that marks the last header row.
pub const PROXY_MARKER: &str = "proxy";

/// How many leading rows are searched.
pub const HEADER_SCAN_ROWS: usize = 20;

/// Guess the number of header rows from column A.
///
/// The row holding `"proxy"` ends the header; failing that, the first
/// non-blank row does. `None` when neither shows up in the first
/// [`HEADER_SCAN_ROWS`] rows.
pub fn detect_header_rows(grid: &dyn GridSource) -> Option<usize> {
    let first_column = move || (0..HEADER_SCAN_ROWS).map_while(move |row| grid.cell(row, 0));

    let marker = first_column().position(|cell| matches!(&cell, CellValue::Text(s) if s == PROXY_MARKER));
    let detected = marker.or_else(|| first_column().position(|cell| !cell.is_blank()));

    let header_rows = detected.map(|row| row + 1);
    debug!(?header_rows, by_marker = marker.is_some(), "detected header rows");
    header_rows
}

/// Compare the detected header count with the configured one.
pub fn check_header_rows(detected: Option<usize>, expected: usize) -> Option<Diagnostic> {
    match detected {
        Some(count) if count == expected => None,
        None => Some(Diagnostic::fail(
            CheckKind::HeaderRows,
            "Could not work out the number of header rows",
        )),
        Some(1) => Some(Diagnostic::fail(
            CheckKind::HeaderRows,
            format!("There is 1 header row - there should be {}", expected),
        )),
        Some(count) => Some(Diagnostic::fail(
            CheckKind::HeaderRows,
            format!("There are {} header rows - there should be {}", count, expected),
        )),
    }
}

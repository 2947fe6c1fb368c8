//! Data row counting.

use tracing::debug;

use crate::sheet::GridSource;

/// Result of walking column A below the headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataExtent {
    /// Rows walked, minus the gaps.
    pub data_rows: usize,
    /// Single blank rows that were stepped over.
    pub gaps: usize,
}

/// Walk column A from `header_rows` down.
///
/// A blank cell followed by a non-blank one is a gap and the walk goes on;
/// two blanks in a row, or the end of the sheet, end it. Reads past the
/// grid simply end the walk.
pub fn detect_data_extent(grid: &dyn GridSource, header_rows: usize) -> DataExtent {
    let mut walked = 0;
    let mut gaps = 0;

    while let Some(cell) = grid.cell(header_rows + walked, 0) {
        if !cell.is_blank() {
            walked += 1;
            continue;
        }
        match grid.cell(header_rows + walked + 1, 0) {
            Some(next) if !next.is_blank() => {
                gaps += 1;
                walked += 1;
            }
            _ => break,
        }
    }

    let extent = DataExtent {
        data_rows: walked - gaps,
        gaps,
    };
    debug!(header_rows, data_rows = extent.data_rows, gaps, "detected data extent");
    extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{CellValue, Grid};

    fn rows(first_column: &[Option<&str>]) -> Grid {
        Grid::from_rows(
            first_column
                .iter()
                .map(|cell| match cell {
                    Some(text) => vec![CellValue::Text(text.to_string())],
                    None => vec![CellValue::Empty],
                })
                .collect(),
        )
    }

    #[test]
    fn test_single_gap_is_counted_and_excluded() {
        let mut column: Vec<Option<&str>> = vec![Some("boron"); 10];
        column[5] = None;
        let grid = rows(&column);

        let extent = detect_data_extent(&grid, 0);
        assert_eq!(extent, DataExtent { data_rows: 9, gaps: 1 });
    }

    #[test]
    fn test_two_blank_rows_end_the_data() {
        let grid = rows(&[Some("proxy"), Some("a"), Some("b"), None, None, Some("notes")]);
        assert_eq!(detect_data_extent(&grid, 1), DataExtent { data_rows: 2, gaps: 0 });
    }

    #[test]
    fn test_trailing_blank_at_end_of_sheet() {
        let grid = rows(&[Some("proxy"), Some("a"), None]);
        assert_eq!(detect_data_extent(&grid, 1), DataExtent { data_rows: 1, gaps: 0 });
    }

    #[test]
    fn test_gap_right_after_headers() {
        let grid = rows(&[Some("proxy"), None, Some("a"), Some("b")]);
        assert_eq!(detect_data_extent(&grid, 1), DataExtent { data_rows: 2, gaps: 1 });
    }

    #[test]
    fn test_header_rows_beyond_sheet() {
        let grid = rows(&[Some("proxy")]);
        assert_eq!(detect_data_extent(&grid, 5), DataExtent::default());
    }
}

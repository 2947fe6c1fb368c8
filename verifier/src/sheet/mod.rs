//! Read-only access to the first worksheet of a spreadsheet.
//!
//! Spreadsheets are only ever read as a grid of typed cells addressed by
//! zero-based `(row, column)`. Workbooks (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`,
//! `.ods`) go through calamine; `.csv` files are decoded with encoding
//! auto-detection and parsed with the csv crate.

pub mod columns;

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::error::{SheetError, SheetResult};

pub use columns::{index_to_letters, is_column_letters, letters_to_index};

// =============================================================================
// Cell values
// =============================================================================

/// The value held by one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Nothing in the cell.
    Empty,
    /// A string cell.
    Text(String),
    /// A number (dates are stored as their serial number).
    Number(f64),
    /// A boolean cell.
    Bool(bool),
    /// A formula error such as `#N/A`.
    Error(String),
}

/// The storage class of a cell, as far as type checks care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Numeric,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Text => write!(f, "text"),
            CellKind::Numeric => write!(f, "numeric"),
        }
    }
}

impl CellValue {
    /// Empty cells and empty strings are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numbers and booleans are numeric; everything else is stored as text.
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Number(_) | CellValue::Bool(_) => CellKind::Numeric,
            _ => CellKind::Text,
        }
    }

    /// The numeric value, if the cell is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }
}

// =============================================================================
// Grid access
// =============================================================================

/// Read-only access to a 2-D grid of cells.
///
/// `cell` returns `None` only when the address lies outside the grid; an
/// in-range cell with nothing in it is `Some(CellValue::Empty)`.
pub trait GridSource {
    /// The cell at zero-based `(row, col)`.
    fn cell(&self, row: usize, col: usize) -> Option<CellValue>;

    /// Number of columns.
    fn width(&self) -> usize;

    /// Number of rows.
    fn height(&self) -> usize;
}

impl GridSource for Range<Data> {
    fn cell(&self, row: usize, col: usize) -> Option<CellValue> {
        let row = u32::try_from(row).ok()?;
        let col = u32::try_from(col).ok()?;
        let (end_row, end_col) = self.end()?;
        if row > end_row || col > end_col {
            return None;
        }
        // Cells above or left of the used range are blank, not missing.
        Some(self.get_value((row, col)).map_or(CellValue::Empty, CellValue::from))
    }

    fn width(&self) -> usize {
        self.end().map_or(0, |(_, col)| col as usize + 1)
    }

    fn height(&self) -> usize {
        self.end().map_or(0, |(row, _)| row as usize + 1)
    }
}

/// An in-memory grid, used for delimited files and in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl Grid {
    /// Build a grid from rows; ragged rows are padded with empty cells.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Parse delimited text. Numeric-looking fields become numbers.
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> SheetResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(parse_field).collect());
        }

        Ok(Self::from_rows(rows))
    }
}

impl GridSource for Grid {
    fn cell(&self, row: usize, col: usize) -> Option<CellValue> {
        if col >= self.width {
            return None;
        }
        let cells = self.rows.get(row)?;
        Some(cells.get(col).cloned().unwrap_or(CellValue::Empty))
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.rows.len()
    }
}

fn parse_field(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

// =============================================================================
// Opening files
// =============================================================================

/// The first worksheet of an opened file.
///
/// The underlying file handle is closed as soon as the sheet is loaded, so
/// dropping a `Sheet` releases everything held for that file.
#[derive(Debug, Clone)]
pub enum Sheet {
    Workbook(Range<Data>),
    Delimited(Grid),
}

impl GridSource for Sheet {
    fn cell(&self, row: usize, col: usize) -> Option<CellValue> {
        match self {
            Sheet::Workbook(range) => range.cell(row, col),
            Sheet::Delimited(grid) => grid.cell(row, col),
        }
    }

    fn width(&self) -> usize {
        match self {
            Sheet::Workbook(range) => GridSource::width(range),
            Sheet::Delimited(grid) => grid.width(),
        }
    }

    fn height(&self) -> usize {
        match self {
            Sheet::Workbook(range) => GridSource::height(range),
            Sheet::Delimited(grid) => grid.height(),
        }
    }
}

/// Open the first worksheet of `path`, choosing the reader by extension.
pub fn open_sheet(path: &Path) -> SheetResult<Sheet> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let bytes = std::fs::read(path)?;
            let encoding = detect_encoding(&bytes);
            let content = decode_content(&bytes, &encoding);
            Ok(Sheet::Delimited(Grid::from_csv_reader(content.as_bytes(), b',')?))
        }
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => {
            let mut workbook = open_workbook_auto(path).map_err(|e| SheetError::Workbook {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let range = workbook
                .worksheet_range_at(0)
                .ok_or_else(|| SheetError::NoWorksheet(path.display().to_string()))?
                .map_err(|e| SheetError::Workbook {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            Ok(Sheet::Workbook(range))
        }
        _ => Err(SheetError::Unsupported(path.display().to_string())),
    }
}

// =============================================================================
// Text decoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" | "latin9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the given encoding, falling back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding {
        // Latin-1 is decoded as its windows-1252 superset, as browsers do
        "iso-8859-1" | "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "iso-8859-15" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Strict UTF-8 decoding: `None` if any byte sequence is malformed.
pub fn decode_utf8_strict(bytes: &[u8]) -> Option<String> {
    encoding_rs::UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_csv_fields_are_typed() {
        let grid = Grid::from_csv_reader("proxy,value\nboron,1.5\nstomata,NA\n".as_bytes(), b',').unwrap();

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.cell(0, 0), Some(text("proxy")));
        assert_eq!(grid.cell(1, 1), Some(CellValue::Number(1.5)));
        assert_eq!(grid.cell(2, 1), Some(text("NA")));
    }

    #[test]
    fn test_ragged_rows_pad_with_empty() {
        let grid = Grid::from_csv_reader("a,b,c\nx\n".as_bytes(), b',').unwrap();

        assert_eq!(grid.cell(1, 0), Some(text("x")));
        assert_eq!(grid.cell(1, 2), Some(CellValue::Empty));
        assert_eq!(grid.cell(1, 3), None);
        assert_eq!(grid.cell(2, 0), None);
    }

    #[test]
    fn test_kind_and_blankness() {
        assert_eq!(CellValue::Number(2.0).kind(), CellKind::Numeric);
        assert_eq!(CellValue::Bool(true).kind(), CellKind::Numeric);
        assert_eq!(text("x").kind(), CellKind::Text);
        assert_eq!(CellValue::Empty.kind(), CellKind::Text);
        assert!(CellValue::Empty.is_blank());
        assert!(text("").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_range_cells_before_used_area_are_empty() {
        let mut range: Range<Data> = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("proxy".into()));
        range.set_value((2, 2), Data::Float(3.5));

        assert_eq!(range.cell(0, 0), Some(CellValue::Empty));
        assert_eq!(range.cell(1, 1), Some(text("proxy")));
        assert_eq!(range.cell(2, 2), Some(CellValue::Number(3.5)));
        assert_eq!(range.cell(3, 0), None);
        assert_eq!(GridSource::width(&range), 3);
        assert_eq!(GridSource::height(&range), 3);
    }

    #[test]
    fn test_open_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        std::fs::write(&path, "proxy,age\nboron,12\n").unwrap();

        let sheet = open_sheet(&path).unwrap();
        assert_eq!(sheet.cell(1, 1), Some(CellValue::Number(12.0)));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = open_sheet(Path::new("notes.txt"));
        assert!(matches!(result, Err(SheetError::Unsupported(_))));
    }

    #[test]
    fn test_strict_utf8_decoding() {
        assert_eq!(decode_utf8_strict("Société".as_bytes()).as_deref(), Some("Société"));
        assert_eq!(decode_utf8_strict(&[0x53, 0x6F, 0x63, 0x69, 0xE9]), None);
    }

    #[test]
    fn test_latin1_decoding() {
        // "½ ¤ ¼ dépôt été" in ISO-8859-1
        let bytes: &[u8] = &[
            0xBD, 0x20, 0xA4, 0x20, 0xBC, 0x20, 0x64, 0xE9, 0x70, 0xF4, 0x74, 0x20, 0xE9, 0x74, 0xE9,
        ];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "½ ¤ ¼ dépôt été");
        assert_eq!(decode_content(&[0xA4], "iso-8859-15"), "€");
    }

    #[test]
    fn test_latin1_csv_keeps_fractions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut content = b"proxy,site\nboron,".to_vec();
        content.extend_from_slice(&[
            0xBD, 0x20, 0xA4, 0x20, 0xBC, 0x20, 0x64, 0xE9, 0x70, 0xF4, 0x74, 0x20, 0xE9, 0x74, 0xE9, 0x0A,
        ]);
        std::fs::write(&path, content).unwrap();

        let sheet = open_sheet(&path).unwrap();
        assert_eq!(sheet.cell(1, 1), Some(text("½ ¤ ¼ dépôt été")));
    }
}

//! Flattening verified spreadsheets into one JSON document.
//!
//! Every accepted file becomes an array of records, one per data row, with
//! the configured properties as keys (in configuration order). The output
//! is an array of those arrays.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use tracing::{debug, info, warn};

use crate::config::{Configuration, MissingValue};
use crate::error::{ConfigError, ExportResult};
use crate::layout::resolve_column;
use crate::sheet::{open_sheet, CellValue, GridSource};

/// One exported row.
pub type Record = Map<String, Value>;

/// Property whose value decides whether a row is kept.
pub const PROXY_KEY: &str = "proxy";

/// Sentinel replaced by `null` when the configuration names none.
pub const DEFAULT_MISSING_VALUE: &str = "NA";

// =============================================================================
// Name maps
// =============================================================================

/// Optional renames applied while exporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMaps {
    /// Property name to output key.
    pub columns: HashMap<String, String>,
    /// Proxy value to the name used downstream.
    pub proxies: HashMap<String, String>,
}

impl NameMaps {
    /// Load the maps named by `column_header_map` and `proxy_name_map`.
    pub fn from_config(config: &Configuration) -> ExportResult<Self> {
        Ok(Self {
            columns: load_name_map(config.column_header_map.as_deref())?,
            proxies: load_name_map(config.proxy_name_map.as_deref())?,
        })
    }

    fn key_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.columns.get(name).map(String::as_str).unwrap_or(name)
    }

    fn rename_proxy(&self, value: Value) -> Value {
        if let Value::String(proxy) = &value {
            if let Some(renamed) = self.proxies.get(proxy) {
                return Value::String(renamed.clone());
            }
        }
        value
    }
}

/// Read a flat `{"from": "to"}` JSON object; no path (or an empty one) is an empty map.
pub fn load_name_map(path: Option<&str>) -> ExportResult<HashMap<String, String>> {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(HashMap::new()),
    }
}

// =============================================================================
// Records
// =============================================================================

fn cell_to_json(cell: CellValue, missing: &MissingValue) -> Value {
    if missing.matches(&cell) {
        return Value::Null;
    }
    match cell {
        CellValue::Empty => Value::String(String::new()),
        CellValue::Text(s) | CellValue::Error(s) => Value::String(s),
        CellValue::Number(n) => serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
        CellValue::Bool(b) => Value::Bool(b),
    }
}

fn has_proxy(record: &Record, proxy_key: &str) -> bool {
    match record.get(proxy_key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Build the records of one sheet.
///
/// Every row below the configured header rows becomes a record holding the
/// resolved properties. Rows without a proxy are dropped.
pub fn sheet_records(
    grid: &dyn GridSource,
    config: &Configuration,
    maps: &NameMaps,
    missing: &MissingValue,
) -> Vec<Record> {
    let header_rows = config.header_rows;
    let columns: Vec<(&str, usize)> = config
        .properties
        .iter()
        .filter_map(|property| {
            resolve_column(property, grid, header_rows).map(|column| (property.name.as_str(), column.index))
        })
        .collect();

    if !columns.iter().any(|(name, _)| *name == PROXY_KEY) {
        warn!("no '{}' column found, sheet contributes no records", PROXY_KEY);
        return Vec::new();
    }
    let proxy_key = maps.key_for(PROXY_KEY);

    (header_rows..grid.height())
        .map(|row| {
            columns
                .iter()
                .map(|&(name, col)| {
                    let value = cell_to_json(grid.cell(row, col).unwrap_or(CellValue::Empty), missing);
                    let value = if name == PROXY_KEY { maps.rename_proxy(value) } else { value };
                    (maps.key_for(name).to_string(), value)
                })
                .collect::<Record>()
        })
        .filter(|record| has_proxy(record, proxy_key))
        .collect()
}

// =============================================================================
// Export run
// =============================================================================

/// Files in the root folder to export: no `~` or `.` prefix, and a
/// configured ending when any are given. Sorted by name.
pub fn export_candidates(config: &Configuration) -> ExportResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(config.root_folder())? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') && config.accepts_file(&name) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Write `datasets` as a 4-space indented JSON array.
pub fn write_json(path: &Path, datasets: &[Vec<Record>]) -> ExportResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    datasets.serialize(&mut serializer)?;
    Ok(())
}

/// Export every candidate file to `output_file`, reporting each file's
/// record count to `on_file`. Returns the total record count.
pub fn generate_json(config: &Configuration, mut on_file: impl FnMut(&str, usize)) -> ExportResult<usize> {
    let output = config
        .output_file
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(ConfigError::MissingKey("output_file"))?;
    let maps = NameMaps::from_config(config)?;
    let missing = config
        .missing_value()
        .unwrap_or_else(|| MissingValue::Text(DEFAULT_MISSING_VALUE.to_string()));

    let mut datasets = Vec::new();
    for path in export_candidates(config)? {
        let sheet = open_sheet(&path)?;
        let records = sheet_records(&sheet, config, &maps, &missing);
        drop(sheet);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(file = %file_name, records = records.len(), "exported sheet");
        on_file(&file_name, records.len());
        datasets.push(records);
    }

    write_json(Path::new(output), &datasets)?;
    let total: usize = datasets.iter().map(Vec::len).sum();
    info!(output, files = datasets.len(), records = total, "wrote JSON export");
    Ok(total)
}

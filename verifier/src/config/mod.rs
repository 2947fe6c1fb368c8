//! Run configuration loaded from a JSON file.
//!
//! The raw JSON is first checked against the embedded schema
//! (`schemas/config.schema.json`, draft 7) so every structural mistake is
//! reported at once, then deserialized into [`Configuration`]. Colour
//! settings are resolved eagerly so an inconsistent colour setup stops the
//! run before any file is touched.
//!
//! # Example
//!
//! ```json
//! {
//!     "root_folder": "./Spreadsheets",
//!     "file_endings": [".xlsx"],
//!     "header_rows": 2,
//!     "missing_value": "NA",
//!     "log_file": "verification.md",
//!     "properties": [
//!         { "name": "proxy", "column": "A", "type": "text", "required": true,
//!           "acceptable_values": ["Boron", "Stomata"] },
//!         { "name": "co2", "column": "?", "type": "numeric", "hard_limits": [0, null] }
//!     ]
//! }
//! ```

pub mod colors;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::sheet::{is_column_letters, CellKind, CellValue};

pub use colors::{ColorDepth, ColorSettings, Palette};

/// Default DOI resolution endpoint; the DOI is appended to it.
pub const DEFAULT_DOI_RESOLVER_URL: &str = "https://dx.doi.org/";

/// Default number of DOI responses kept in memory.
pub const DEFAULT_DOI_CACHE_CAPACITY: usize = 16;

static CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/config.schema.json"))
        .expect("Invalid embedded schema")
});

// =============================================================================
// Properties
// =============================================================================

/// Declared content type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "DOI")]
    Doi,
    #[serde(rename = "reference")]
    Reference,
}

impl PropertyType {
    /// The storage class a cell needs to satisfy this type.
    pub fn storage(self) -> CellKind {
        match self {
            PropertyType::Numeric => CellKind::Numeric,
            PropertyType::Text | PropertyType::Doi | PropertyType::Reference => CellKind::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Text => "text",
            PropertyType::Numeric => "numeric",
            PropertyType::Doi => "DOI",
            PropertyType::Reference => "reference",
        }
    }
}

/// An inclusive `[min, max]` pair; either side may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Option<f64>, Option<f64>)", into = "(Option<f64>, Option<f64>)")]
pub struct Limits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl From<(Option<f64>, Option<f64>)> for Limits {
    fn from((min, max): (Option<f64>, Option<f64>)) -> Self {
        Self { min, max }
    }
}

impl From<Limits> for (Option<f64>, Option<f64>) {
    fn from(limits: Limits) -> Self {
        (limits.min, limits.max)
    }
}

/// Where a property lives in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// `"?"`: find the column by its header text.
    Unknown,
    /// Column letters given literally.
    Letters(String),
}

/// One configured column and the checks applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub column: String,
    #[serde(rename = "type", default)]
    pub kind: Option<PropertyType>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub hard_limits: Option<Limits>,
    #[serde(default)]
    pub soft_limits: Option<Limits>,
    #[serde(default)]
    pub acceptable_values: Option<Vec<String>>,
    #[serde(default)]
    pub match_case: Option<bool>,
}

impl PropertySpec {
    pub fn column_spec(&self) -> ColumnSpec {
        if self.column == "?" {
            ColumnSpec::Unknown
        } else {
            ColumnSpec::Letters(self.column.clone())
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Comparisons ignore case unless `match_case` is explicitly true.
    pub fn matches_case(&self) -> bool {
        self.match_case.unwrap_or(false)
    }

    pub fn is_type(&self, kind: PropertyType) -> bool {
        self.kind == Some(kind)
    }
}

// =============================================================================
// Missing values
// =============================================================================

/// The sentinel written in cells whose value is unknown.
#[derive(Debug, Clone, PartialEq)]
pub enum MissingValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl MissingValue {
    /// `null` and `""` mean "no sentinel configured".
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(MissingValue::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(MissingValue::Number),
            Value::Bool(b) => Some(MissingValue::Bool(*b)),
            _ => None,
        }
    }

    pub fn matches(&self, cell: &CellValue) -> bool {
        match (self, cell) {
            (MissingValue::Text(m), CellValue::Text(c)) => m == c,
            (MissingValue::Number(m), CellValue::Number(c)) => m == c,
            (MissingValue::Bool(m), CellValue::Bool(c)) => m == c,
            _ => false,
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// The whole run configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub root_folder: String,
    #[serde(default)]
    pub file_endings: Vec<String>,
    pub header_rows: usize,
    #[serde(default)]
    pub missing_value: Option<Value>,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(flatten)]
    pub colors: ColorSettings,
    pub properties: Vec<PropertySpec>,
    #[serde(default)]
    pub doi_resolver_url: Option<String>,
    #[serde(default)]
    pub doi_cache_capacity: Option<usize>,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub column_header_map: Option<String>,
    #[serde(default)]
    pub proxy_name_map: Option<String>,
}

impl Configuration {
    /// Load and check a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and check configuration JSON.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let raw: Value = serde_json::from_str(content)?;
        Self::from_value(raw)
    }

    /// Check raw JSON against the schema, then build the typed configuration.
    pub fn from_value(raw: Value) -> ConfigResult<Self> {
        validate_against_schema(&raw)?;

        let mut config: Configuration = serde_json::from_value(raw)?;
        if !config.root_folder.ends_with('/') {
            config.root_folder.push('/');
        }

        for property in &config.properties {
            if property.column != "?" && !is_column_letters(&property.column) {
                return Err(ConfigError::InvalidColumn {
                    property: property.name.clone(),
                    column: property.column.clone(),
                });
            }
        }

        config.colors.palette()?;

        Ok(config)
    }

    pub fn root_folder(&self) -> PathBuf {
        PathBuf::from(&self.root_folder)
    }

    pub fn missing_value(&self) -> Option<MissingValue> {
        self.missing_value.as_ref().and_then(MissingValue::from_json)
    }

    /// The log file path; an empty string disables the log.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    pub fn palette(&self) -> ConfigResult<Palette> {
        self.colors.palette()
    }

    pub fn doi_resolver_url(&self) -> &str {
        self.doi_resolver_url
            .as_deref()
            .unwrap_or(DEFAULT_DOI_RESOLVER_URL)
    }

    pub fn doi_cache_capacity(&self) -> usize {
        self.doi_cache_capacity
            .unwrap_or(DEFAULT_DOI_CACHE_CAPACITY)
            .max(1)
    }

    /// Whether a directory entry should be processed: it must not be an
    /// editor lock file (`~` prefix) and must end with a configured suffix.
    /// No configured suffix means every file qualifies.
    pub fn accepts_file(&self, file_name: &str) -> bool {
        if file_name.starts_with('~') {
            return false;
        }
        self.file_endings.is_empty()
            || self
                .file_endings
                .iter()
                .any(|ending| file_name.ends_with(ending.as_str()))
    }
}

fn validate_against_schema(raw: &Value) -> ConfigResult<()> {
    let validator = jsonschema::draft7::new(&CONFIG_SCHEMA).map_err(|e| ConfigError::SchemaError {
        errors: vec![format!("Invalid schema: {}", e)],
    })?;

    let errors: Vec<String> = validator.iter_errors(raw).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::SchemaError { errors })
    }
}

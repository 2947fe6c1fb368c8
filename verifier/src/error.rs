//! Error types for the verification and export runs.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - configuration loading and consistency errors
//! - [`SheetError`] - spreadsheet opening errors
//! - [`DoiError`] - DOI resolution transport errors
//! - [`VerifyError`] - top-level verification run errors
//! - [`ExportError`] - top-level JSON export errors
//!
//! Problems found *inside* a spreadsheet are never errors: they are
//! [`crate::report::Diagnostic`]s. Only conditions that stop a run live here.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading or checking the JSON configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid JSON or does not fit the typed model.
    #[error("Invalid configuration JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The configuration violates the embedded schema.
    #[error("Configuration does not match schema: {}", errors.join("; "))]
    SchemaError { errors: Vec<String> },

    /// A property column is neither `?` nor a letter sequence.
    #[error("Invalid column specifier '{column}' for property '{property}'")]
    InvalidColumn { property: String, column: String },

    /// Colour bits other than 8 or 24.
    #[error("Color bits must be 8 or 24 (8 for default Mac Terminal), got {0}")]
    ColorBits(u64),

    /// A colour name that is neither known nor a hex code.
    #[error("Unknown color option: {0}")]
    UnknownColor(String),

    /// An RGB hex colour requested while running in 8-bit mode.
    #[error("RGB color '{0}' is incompatible with 8 bit color mode")]
    RgbUnder8Bit(String),

    /// A key needed by the requested command is absent.
    #[error("Missing configuration key: {0}")]
    MissingKey(&'static str),
}

// =============================================================================
// Spreadsheet Errors
// =============================================================================

/// Errors while opening a spreadsheet.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// calamine could not open the workbook.
    #[error("Cannot open workbook '{path}': {message}")]
    Workbook { path: String, message: String },

    /// The workbook has no first worksheet.
    #[error("Workbook '{0}' has no worksheet")]
    NoWorksheet(String),

    /// The file extension is not handled.
    #[error("Unsupported spreadsheet type: {0}")]
    Unsupported(String),

    /// Invalid CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// DOI Resolution Errors
// =============================================================================

/// Errors from the DOI resolution service.
///
/// A non-200 response is *not* an error; it is a lookup result that the
/// validator turns into a diagnostic. Only transport failures land here.
#[derive(Debug, Error)]
pub enum DoiError {
    /// HTTP transport failed (connection refused, timeout, ...).
    #[error("DOI lookup for '{doi}' failed: {source}")]
    Transport {
        doi: String,
        #[source]
        source: reqwest::Error,
    },
}

// =============================================================================
// Verification Errors (top-level)
// =============================================================================

/// Top-level errors of a verification run.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Spreadsheet error.
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    /// DOI service error.
    #[error("DOI error: {0}")]
    Doi(#[from] DoiError),

    /// Reading the root folder or writing the log failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Export Errors (top-level)
// =============================================================================

/// Top-level errors of a JSON export run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Spreadsheet error.
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Reading a map file or writing the output failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A map file or the output could not be (de)serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for spreadsheet operations.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for verification runs.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Result type for export runs.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ConfigError -> VerifyError
        let config_err = ConfigError::MissingKey("output_file");
        let verify_err: VerifyError = config_err.into();
        assert!(verify_err.to_string().contains("output_file"));

        // SheetError -> ExportError
        let sheet_err = SheetError::Unsupported("notes.txt".into());
        let export_err: ExportError = sheet_err.into();
        assert!(export_err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_schema_error_lists_every_violation() {
        let err = ConfigError::SchemaError {
            errors: vec!["\"root_folder\" is a required property".into(), "8 is not one of [1]".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("root_folder"));
        assert!(msg.contains("; "));
    }
}

//! # Paleosheet - PaleoCO2 spreadsheet verification and export
//!
//! Paleosheet checks loosely structured scientific spreadsheets against a
//! declarative JSON rule set before they are admitted into the PaleoCO2
//! archive, and flattens accepted spreadsheets into a single JSON document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ Spreadsheet │──▶│   Layout    │──▶│ Rule engine │──▶│ DOI checks  │──▶│   Report    │
//! │ (xlsx/csv)  │   │ (hdr/rows)  │   │ (per column)│   │ (cached)    │   │ (log/tally) │
//! └─────────────┘   └─────────────┘   └─────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paleosheet::{Configuration, DiagnosticLog, Verifier};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Configuration::load("config.json".as_ref()).unwrap();
//!     let mut verifier = Verifier::from_config(config);
//!     let summary = verifier.run(&mut DiagnosticLog::disabled(), |_| {}).await.unwrap();
//!     println!("{} files checked", summary.processed);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Schema-checked JSON configuration
//! - [`sheet`] - Cell access for workbooks and CSV files
//! - [`layout`] - Header rows, data extent and column binding
//! - [`rules`] - The per-column check battery
//! - [`cache`] - Bounded lookup cache
//! - [`doi`] - DOI resolution and reference cross-checks
//! - [`report`] - Diagnostics, verdicts, log file and console
//! - [`verify`] - The per-file verification pipeline
//! - [`export`] - JSON flattening

// Core modules
pub mod error;
pub mod config;

// Reading sheets
pub mod sheet;
pub mod layout;

// Checking
pub mod rules;
pub mod cache;
pub mod doi;

// Output
pub mod report;

// Runs
pub mod verify;
pub mod export;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, DoiError, ExportError, ExportResult, SheetError, SheetResult, VerifyError,
    VerifyResult,
};

// =============================================================================
// Re-exports - Configuration and sheets
// =============================================================================

pub use config::{Configuration, Limits, MissingValue, Palette, PropertySpec, PropertyType};

pub use sheet::{open_sheet, CellKind, CellValue, Grid, GridSource, Sheet};

// =============================================================================
// Re-exports - Checks
// =============================================================================

pub use layout::{ColumnBindings, ColumnRef, DataExtent, SheetLayout};

pub use rules::{RuleEngine, RuleOutcome, SheetView, TypeGates};

pub use cache::{CacheStats, LookupCache};

pub use doi::{DoiResolver, DoiResponse, DoiService, ExternalReferenceValidator, HttpDoiResolver};

// =============================================================================
// Re-exports - Reporting and runs
// =============================================================================

pub use report::{
    CheckKind, Console, Diagnostic, DiagnosticLog, FileReport, RunSummary, Severity, Verdict,
};

pub use verify::Verifier;

pub use export::{generate_json, NameMaps, Record};

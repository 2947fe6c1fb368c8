//! High-level verification pipeline.
//!
//! For each candidate file the steps are: detect header rows, check them
//! against the configured count, measure the data extent, bind columns,
//! run the rule engine, then the DOI and reference checks.
//!
//! # Example
//!
//! ```rust,ignore
//! use paleosheet::{Configuration, DiagnosticLog, Verifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Configuration::load(Path::new("config.json"))?;
//!     let mut log = DiagnosticLog::create(config.log_file().as_deref())?;
//!     let mut verifier = Verifier::from_config(config);
//!
//!     let summary = verifier.run(&mut log, |report| println!("{}", report.verdict())).await?;
//!     println!("{} files processed", summary.processed);
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{Configuration, MissingValue};
use crate::doi::{DoiResolver, DoiService, ExternalReferenceValidator, HttpDoiResolver};
use crate::error::{DoiError, VerifyResult};
use crate::layout::{check_header_rows, detect_data_extent, detect_header_rows, ColumnBindings, SheetLayout};
use crate::report::{DiagnosticLog, FileReport, RunSummary};
use crate::rules::{RuleEngine, SheetView};
use crate::sheet::{open_sheet, GridSource};

/// Checks spreadsheets against one configuration.
pub struct Verifier<R> {
    config: Configuration,
    missing: Option<MissingValue>,
    service: DoiService<R>,
}

impl Verifier<HttpDoiResolver> {
    /// A verifier talking to the configured (or `DOI_RESOLVER_URL`) resolver.
    pub fn from_config(config: Configuration) -> Self {
        let resolver = HttpDoiResolver::from_env(config.doi_resolver_url());
        Self::with_resolver(config, resolver)
    }
}

impl<R: DoiResolver> Verifier<R> {
    pub fn with_resolver(config: Configuration, resolver: R) -> Self {
        let missing = config.missing_value();
        let service = DoiService::new(resolver, config.doi_cache_capacity());
        Self {
            config,
            missing,
            service,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn service(&self) -> &DoiService<R> {
        &self.service
    }

    /// Run every check over one sheet.
    ///
    /// When the header row count cannot be worked out the report holds that
    /// single failure and nothing else is checked.
    pub async fn verify_grid(&mut self, file_name: &str, grid: &dyn GridSource) -> Result<FileReport, DoiError> {
        let mut report = FileReport::new(file_name);

        let detected = detect_header_rows(grid);
        report.extend(check_header_rows(detected, self.config.header_rows));
        let Some(header_rows) = detected else {
            warn!(file = file_name, "could not work out header rows, skipping remaining checks");
            return Ok(report);
        };

        let layout = SheetLayout::new(header_rows, detect_data_extent(grid, header_rows));
        let (bindings, notes) = ColumnBindings::resolve(&self.config.properties, grid, header_rows);
        report.extend(notes);
        debug!(
            file = file_name,
            header_rows,
            data_rows = layout.data_rows,
            resolved = bindings.resolved_count(),
            "sheet laid out"
        );

        let view = SheetView::new(grid, layout, self.missing.as_ref());
        let outcome = RuleEngine::new(&self.config.properties).run(&view, &bindings);
        report.extend(outcome.diagnostics);

        let external = ExternalReferenceValidator::new(&self.config.properties)
            .run(&mut self.service, &view, &bindings, &outcome.gates)
            .await?;
        report.extend(external);

        Ok(report)
    }

    /// Open and verify one file. The sheet is released before returning.
    pub async fn verify_file(&mut self, path: &Path) -> VerifyResult<FileReport> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let sheet = open_sheet(path)?;
        let report = self.verify_grid(&file_name, &sheet).await?;
        Ok(report)
    }

    /// Files in the root folder that the configuration accepts, sorted by name.
    pub fn candidate_files(&self) -> VerifyResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(self.config.root_folder())? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            if self.config.accepts_file(&entry.file_name().to_string_lossy()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Verify every candidate file, writing each report to `log` and
    /// handing it to `on_file` as soon as it is ready.
    pub async fn run(
        &mut self,
        log: &mut DiagnosticLog,
        mut on_file: impl FnMut(&FileReport),
    ) -> VerifyResult<RunSummary> {
        let mut summary = RunSummary::default();

        for path in self.candidate_files()? {
            let report = self.verify_file(&path).await?;
            let verdict = report.verdict();
            info!(file = %report.file_name, %verdict, diagnostics = report.diagnostics.len(), "verified");

            log.write_report(&report)?;
            summary.record(verdict);
            on_file(&report);
        }
        log.flush()?;

        let stats = self.service.cache_stats();
        debug!(hits = stats.hits, misses = stats.misses, "DOI cache");
        Ok(summary)
    }
}

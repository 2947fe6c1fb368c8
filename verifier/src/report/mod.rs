//! Diagnostics, per-file verdicts and run totals.
//!
//! Every check returns plain [`Diagnostic`]s. A [`FileReport`] keeps them in
//! execution order and derives both the file [`Verdict`] and the grouped
//! entries written to the log file. [`RunSummary`] tallies verdicts across
//! the run.

pub mod console;
pub mod log;

use serde::Serialize;
use std::fmt;

pub use console::Console;
pub use log::{render_report, DiagnosticLog};

// =============================================================================
// Diagnostics
// =============================================================================

/// How much a diagnostic matters for the file verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A note; does not affect the verdict.
    Info,
    /// Worth a look; the file is at most `WARN`.
    Warn,
    /// The file is `FAIL`.
    Fail,
}

/// The check that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    HeaderRows,
    ColumnLookup,
    Name,
    Required,
    Type,
    TypeGate,
    HardLimits,
    SoftLimits,
    AcceptableValues,
    Doi,
    Reference,
}

/// One finding, addressed to a column and optionally a 1-based row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub check: CheckKind,
    /// Column letters, when the finding concerns one column.
    pub column: Option<String>,
    /// 1-based sheet row, when the finding concerns one cell.
    pub row: Option<usize>,
    pub message: String,
    /// Suggested replacement text (reference mismatches).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            check,
            column: None,
            row: None,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn fail(check: CheckKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Fail, check, message)
    }

    pub fn warn(check: CheckKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, check, message)
    }

    pub fn info(check: CheckKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, check, message)
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// The log line for this diagnostic. Failures are markdown list items.
    pub fn render(&self) -> String {
        match self.severity {
            Severity::Fail => format!("1. {}", self.message),
            Severity::Warn | Severity::Info => self.message.clone(),
        }
    }
}

// =============================================================================
// Per-file report
// =============================================================================

/// Verdict for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Warn => "WARN",
            Verdict::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All diagnostics for one file, in check-execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// `Fail` if any failure, else `Warn` if any warning, else `Pass`.
    pub fn verdict(&self) -> Verdict {
        match self.diagnostics.iter().map(|d| d.severity).max() {
            Some(Severity::Fail) => Verdict::Fail,
            Some(Severity::Warn) => Verdict::Warn,
            Some(Severity::Info) | None => Verdict::Pass,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    /// Log entries: consecutive diagnostics from the same check on the same
    /// column are joined into one newline-separated entry.
    pub fn log_entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = Vec::new();
        let mut previous: Option<(CheckKind, Option<&str>)> = None;

        for diagnostic in &self.diagnostics {
            let key = (diagnostic.check, diagnostic.column.as_deref());
            match entries.last_mut() {
                Some(entry) if previous == Some(key) => {
                    entry.push('\n');
                    entry.push_str(&diagnostic.render());
                }
                _ => entries.push(diagnostic.render()),
            }
            previous = Some(key);
        }

        entries
    }
}

// =============================================================================
// Run totals
// =============================================================================

/// Verdict counts for a whole run; `processed == passed + warned + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

/// Verdict shares in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentages {
    pub pass: f64,
    pub warn: f64,
    pub fail: f64,
}

impl RunSummary {
    pub fn record(&mut self, verdict: Verdict) {
        self.processed += 1;
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Warn => self.warned += 1,
            Verdict::Fail => self.failed += 1,
        }
    }

    /// Shares rounded to two decimals; `None` when no file was processed.
    pub fn percentages(&self) -> Option<Percentages> {
        if self.processed == 0 {
            return None;
        }
        let share = |count: usize| {
            let percent = count as f64 / self.processed as f64 * 100.0;
            (percent * 100.0).round() / 100.0
        };
        Some(Percentages {
            pass: share(self.passed),
            warn: share(self.warned),
            fail: share(self.failed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_pass_when_empty() {
        assert_eq!(FileReport::new("a.xlsx").verdict(), Verdict::Pass);
    }

    #[test]
    fn test_verdict_info_only_is_pass() {
        let mut report = FileReport::new("a.xlsx");
        report.push(Diagnostic::info(CheckKind::ColumnLookup, "Could not find header '_age_'"));
        assert_eq!(report.verdict(), Verdict::Pass);
    }

    #[test]
    fn test_verdict_single_warning_is_warn() {
        let mut report = FileReport::new("a.xlsx");
        report.push(Diagnostic::warn(CheckKind::SoftLimits, "The value in B3 is less than the suggested minimum"));
        assert_eq!(report.verdict(), Verdict::Warn);
    }

    #[test]
    fn test_verdict_fail_dominates_warnings() {
        let mut report = FileReport::new("a.xlsx");
        report.push(Diagnostic::warn(CheckKind::SoftLimits, "soft"));
        report.push(Diagnostic::fail(CheckKind::Required, "hard"));
        report.push(Diagnostic::warn(CheckKind::Reference, "ref"));
        assert_eq!(report.verdict(), Verdict::Fail);
        assert_eq!(report.count(Severity::Warn), 2);
    }

    #[test]
    fn test_log_entries_group_by_check_and_column() {
        let mut report = FileReport::new("a.xlsx");
        report.push(Diagnostic::fail(CheckKind::Type, "row 3").with_column("B").with_row(3));
        report.push(Diagnostic::fail(CheckKind::Type, "row 5").with_column("B").with_row(5));
        report.push(Diagnostic::fail(CheckKind::Type, "row 4").with_column("C").with_row(4));
        report.push(Diagnostic::warn(CheckKind::SoftLimits, "soft").with_column("C"));

        let entries = report.log_entries();
        assert_eq!(entries, vec!["1. row 3\n1. row 5", "1. row 4", "soft"]);
    }

    #[test]
    fn test_summary_invariant_and_percentages() {
        let mut summary = RunSummary::default();
        summary.record(Verdict::Pass);
        summary.record(Verdict::Warn);
        summary.record(Verdict::Fail);

        assert_eq!(summary.processed, summary.passed + summary.warned + summary.failed);
        let pct = summary.percentages().unwrap();
        assert_eq!(pct.pass, 33.33);
        assert_eq!(pct.fail, 33.33);
    }

    #[test]
    fn test_percentages_without_files() {
        assert_eq!(RunSummary::default().percentages(), None);
    }
}

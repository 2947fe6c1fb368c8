//! The markdown-flavoured diagnostic log file.
//!
//! ```text
//! # boron_2021.xlsx␣␣
//! 1. The value in B7 is missing but required␣␣
//! ␣␣
//! ```
//!
//! Every entry ends with two spaces (a markdown hard break) and files are
//! separated by a blank entry.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::FileReport;

/// Render one file's section of the log.
pub fn render_report(report: &FileReport) -> String {
    let mut out = String::new();
    push_line(&mut out, &format!("# {}", report.file_name));
    for entry in report.log_entries() {
        push_line(&mut out, &entry);
    }
    push_line(&mut out, "");
    out
}

fn push_line(out: &mut String, content: &str) {
    out.push_str(content);
    out.push_str("  \n");
}

/// Writer for the log file; a no-op when no log file is configured.
pub struct DiagnosticLog {
    writer: Option<BufWriter<File>>,
}

impl DiagnosticLog {
    /// Create (truncate) the log file, or a disabled log for `None`.
    pub fn create(path: Option<&Path>) -> io::Result<Self> {
        let writer = match path {
            Some(p) => Some(BufWriter::new(File::create(p)?)),
            None => None,
        };
        Ok(Self { writer })
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn write_report(&mut self, report: &FileReport) -> io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(render_report(report).as_bytes())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CheckKind, Diagnostic};

    #[test]
    fn test_render_report_layout() {
        let mut report = FileReport::new("boron.xlsx");
        report.push(Diagnostic::fail(CheckKind::Required, "The value in B7 is missing but required").with_column("B").with_row(7));

        let text = render_report(&report);
        assert_eq!(
            text,
            "# boron.xlsx  \n1. The value in B7 is missing but required  \n  \n"
        );
    }

    #[test]
    fn test_clean_file_has_heading_only() {
        let text = render_report(&FileReport::new("clean.xlsx"));
        assert_eq!(text, "# clean.xlsx  \n  \n");
    }

    #[test]
    fn test_log_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.md");

        let mut log = DiagnosticLog::create(Some(path.as_path())).unwrap();
        assert!(log.is_enabled());
        log.write_report(&FileReport::new("a.csv")).unwrap();
        log.write_report(&FileReport::new("b.csv")).unwrap();
        log.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "# a.csv  \n  \n# b.csv  \n  \n");
    }
}

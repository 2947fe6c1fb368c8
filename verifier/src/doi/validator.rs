//! DOI and reference checks.
//!
//! These run after the rule engine has finished with every property, so the
//! DOI column a reference column is paired with has always been resolved.
//! Both are type-gated like the limit checks.

use tracing::debug;

use super::{DoiResolver, DoiService};
use crate::config::{PropertySpec, PropertyType};
use crate::error::DoiError;
use crate::layout::{ColumnBindings, ColumnRef};
use crate::report::{CheckKind, Diagnostic, Severity};
use crate::rules::checks::{cell_finding, collapse};
use crate::rules::{SheetView, TypeGates};
use crate::sheet::{decode_utf8_strict, detect_encoding};

/// Every DOI starts with the `10.` directory indicator.
pub const DOI_PREFIX: &str = "10.";

/// Each non-exempt cell must look like a DOI and resolve with HTTP 200.
pub async fn check_doi<R: DoiResolver>(
    service: &mut DoiService<R>,
    view: &SheetView<'_>,
    column: &ColumnRef,
) -> Result<Vec<Diagnostic>, DoiError> {
    let mut per_row = Vec::new();

    for (row, cell) in view.column_cells(column) {
        if view.is_exempt(&cell) {
            continue;
        }
        let doi = cell.to_string();
        if !doi.starts_with(DOI_PREFIX) {
            per_row.push(cell_finding(
                Severity::Fail,
                CheckKind::Doi,
                column,
                row,
                "is not a properly formatted DOI",
            ));
            continue;
        }
        if !service.lookup(&doi).await?.is_success() {
            per_row.push(cell_finding(Severity::Fail, CheckKind::Doi, column, row, "is not a valid DOI"));
        }
    }

    Ok(collapse(per_row, view.data_rows(), || {
        Diagnostic::fail(CheckKind::Doi, format!("Values in column {} are not valid DOIs", column.letters))
            .with_column(column.letters.clone())
    }))
}

/// Each non-exempt reference cell must equal the bibliography text the
/// resolver returns for the DOI on the same row. Mismatches are warnings
/// carrying the fetched text as the suggestion. Rows whose DOI is malformed
/// or does not resolve are left to [`check_doi`].
pub async fn check_reference<R: DoiResolver>(
    service: &mut DoiService<R>,
    view: &SheetView<'_>,
    column: &ColumnRef,
    doi_column: &ColumnRef,
) -> Result<Vec<Diagnostic>, DoiError> {
    let mut findings = Vec::new();
    let mut mismatches = 0;
    let mut last_reference = None;

    for offset in 0..view.data_rows() {
        let value = view.data_cell(offset, column);
        if view.is_exempt(&value) {
            continue;
        }
        let row = view.layout().sheet_row(offset);
        let doi = view.data_cell(offset, doi_column).to_string();
        if !doi.starts_with(DOI_PREFIX) {
            continue;
        }

        let response = service.lookup(&doi).await?;
        if !response.is_success() {
            continue;
        }

        match decode_utf8_strict(&response.body) {
            Some(reference) if reference == value.to_string() => {}
            Some(reference) => {
                mismatches += 1;
                findings.push(
                    Diagnostic::warn(
                        CheckKind::Reference,
                        format!(
                            "The value in {}{} does not match the DOI acquired reference which is: {}",
                            column.letters, row, reference
                        ),
                    )
                    .with_column(column.letters.clone())
                    .with_row(row)
                    .with_suggestion(reference.clone()),
                );
                last_reference = Some(reference);
            }
            None => {
                let charset = detect_encoding(&response.body);
                debug!(doi = %doi, %charset, "reference body is not UTF-8");
                findings.push(
                    Diagnostic::info(
                        CheckKind::Reference,
                        format!("The reference for {}{} can not be decoded (looks like {})", column.letters, row, charset),
                    )
                    .with_column(column.letters.clone())
                    .with_row(row),
                );
            }
        }
    }

    match last_reference {
        Some(reference) if mismatches == view.data_rows() => Ok(vec![Diagnostic::warn(
            CheckKind::Reference,
            format!(
                "The content of column {} does not match the information linked to the DOI, which is: \n{}",
                column.letters, reference
            ),
        )
        .with_column(column.letters.clone())
        .with_suggestion(reference)]),
        _ => Ok(findings),
    }
}

/// Runs the DOI pass over every property, then the reference pass.
pub struct ExternalReferenceValidator<'a> {
    properties: &'a [PropertySpec],
}

impl<'a> ExternalReferenceValidator<'a> {
    pub fn new(properties: &'a [PropertySpec]) -> Self {
        Self { properties }
    }

    /// References are paired with the last resolved DOI-typed property.
    pub async fn run<R: DoiResolver>(
        &self,
        service: &mut DoiService<R>,
        view: &SheetView<'_>,
        bindings: &ColumnBindings,
        gates: &TypeGates,
    ) -> Result<Vec<Diagnostic>, DoiError> {
        let mut diagnostics = Vec::new();
        let mut doi_column = None;

        for (index, column) in bindings.iter() {
            if !self.properties[index].is_type(PropertyType::Doi) {
                continue;
            }
            doi_column = Some(column);
            if gates.is_open(index) {
                diagnostics.extend(check_doi(service, view, column).await?);
            }
        }

        for (index, column) in bindings.iter() {
            if !self.properties[index].is_type(PropertyType::Reference) || !gates.is_open(index) {
                continue;
            }
            match doi_column {
                Some(doi_column) => diagnostics.extend(check_reference(service, view, column, doi_column).await?),
                None => diagnostics.push(
                    Diagnostic::info(
                        CheckKind::Reference,
                        "Could not check references because there is no DOI column",
                    )
                    .with_column(column.letters.clone()),
                ),
            }
        }

        Ok(diagnostics)
    }
}

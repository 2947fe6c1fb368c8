//! Individual column checks.
//!
//! Each check returns its diagnostics in row order. When *every* data row of
//! a column fails a check, the per-row lines are replaced by one line about
//! the whole column.

use std::collections::HashSet;

use super::SheetView;
use crate::config::{Limits, PropertySpec};
use crate::layout::ColumnRef;
use crate::report::{CheckKind, Diagnostic, Severity};

/// Result of the type check; `passed` opens the type gate.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheck {
    pub diagnostics: Vec<Diagnostic>,
    pub passed: bool,
}

/// Replace per-row findings by `whole_column` when all rows failed.
pub(crate) fn collapse(per_row: Vec<Diagnostic>, data_rows: usize, whole_column: impl FnOnce() -> Diagnostic) -> Vec<Diagnostic> {
    if !per_row.is_empty() && per_row.len() == data_rows {
        vec![whole_column()]
    } else {
        per_row
    }
}

pub(crate) fn cell_finding(severity: Severity, check: CheckKind, column: &ColumnRef, row: usize, what: &str) -> Diagnostic {
    Diagnostic::new(severity, check, format!("The value in {}{} {}", column.letters, row, what))
        .with_column(column.letters.clone())
        .with_row(row)
}

/// Header text must equal the property name; case-insensitive unless
/// `match_case` is set.
pub fn check_name(view: &SheetView<'_>, property: &PropertySpec, column: &ColumnRef) -> Option<Diagnostic> {
    let title = view.title(column).to_string();
    let (expected, actual) = if property.matches_case() {
        (property.name.clone(), title)
    } else {
        (property.name.to_lowercase(), title.to_lowercase())
    };

    if expected == actual {
        return None;
    }
    Some(
        Diagnostic::fail(
            CheckKind::Name,
            format!(
                "The title of column {} should be _'{}'_ but is _'{}'_",
                column.letters, expected, actual
            ),
        )
        .with_column(column.letters.clone()),
    )
}

/// A required column must not contain the missing-value sentinel.
pub fn check_required(view: &SheetView<'_>, property: &PropertySpec, column: &ColumnRef) -> Vec<Diagnostic> {
    if !property.is_required() {
        return Vec::new();
    }
    view.column_cells(column)
        .filter(|(_, cell)| view.is_exempt(cell))
        .map(|(row, _)| cell_finding(Severity::Fail, CheckKind::Required, column, row, "is missing but required"))
        .collect()
}

/// Cells must be stored as the declared type. DOI and reference columns
/// are textual. Untyped properties always pass.
pub fn check_type(view: &SheetView<'_>, property: &PropertySpec, column: &ColumnRef) -> TypeCheck {
    let Some(declared) = property.kind else {
        return TypeCheck { diagnostics: Vec::new(), passed: true };
    };
    let expected = declared.storage();

    let mut last_actual = expected;
    let per_row: Vec<Diagnostic> = view
        .column_cells(column)
        .filter(|(_, cell)| !view.is_exempt(cell))
        .filter_map(|(row, cell)| {
            let actual = cell.kind();
            (actual != expected).then(|| {
                last_actual = actual;
                cell_finding(
                    Severity::Fail,
                    CheckKind::Type,
                    column,
                    row,
                    &format!("should be a {} but is a {}", declared.as_str(), actual),
                )
            })
        })
        .collect();

    let passed = per_row.is_empty();
    let diagnostics = collapse(per_row, view.data_rows(), || {
        Diagnostic::fail(
            CheckKind::Type,
            format!(
                "Values in column {} should be a {} but are {}",
                column.letters,
                declared.as_str(),
                last_actual
            ),
        )
        .with_column(column.letters.clone())
    });

    TypeCheck { diagnostics, passed }
}

struct LimitWording {
    check: CheckKind,
    severity: Severity,
    adjective: &'static str,
}

fn check_limits(view: &SheetView<'_>, column: &ColumnRef, limits: Limits, wording: LimitWording) -> Vec<Diagnostic> {
    let per_row: Vec<Diagnostic> = view
        .column_cells(column)
        .filter(|(_, cell)| !view.is_exempt(cell))
        .filter_map(|(row, cell)| {
            let value = cell.as_number()?;
            let (problem, bound) = match (limits.min, limits.max) {
                (Some(min), _) if value < min => ("less than", "minimum"),
                (_, Some(max)) if value > max => ("more than", "maximum"),
                _ => return None,
            };
            Some(cell_finding(
                wording.severity,
                wording.check,
                column,
                row,
                &format!("is {} the {} {}", problem, wording.adjective, bound),
            ))
        })
        .collect();

    collapse(per_row, view.data_rows(), || {
        Diagnostic::new(
            wording.severity,
            wording.check,
            format!("Values in column {} are all outside the {} limits", column.letters, wording.adjective),
        )
        .with_column(column.letters.clone())
    })
}

/// Numeric cells outside `hard_limits` fail. Bounds are inclusive.
pub fn check_hard_limits(view: &SheetView<'_>, property: &PropertySpec, column: &ColumnRef) -> Vec<Diagnostic> {
    match property.hard_limits {
        Some(limits) => check_limits(
            view,
            column,
            limits,
            LimitWording { check: CheckKind::HardLimits, severity: Severity::Fail, adjective: "specified" },
        ),
        None => Vec::new(),
    }
}

/// Numeric cells outside `soft_limits` only warn.
pub fn check_soft_limits(view: &SheetView<'_>, property: &PropertySpec, column: &ColumnRef) -> Vec<Diagnostic> {
    match property.soft_limits {
        Some(limits) => check_limits(
            view,
            column,
            limits,
            LimitWording { check: CheckKind::SoftLimits, severity: Severity::Warn, adjective: "suggested" },
        ),
        None => Vec::new(),
    }
}

/// Cells must be one of `acceptable_values`; case-insensitive unless
/// `match_case` is set.
pub fn check_acceptable_values(view: &SheetView<'_>, property: &PropertySpec, column: &ColumnRef) -> Vec<Diagnostic> {
    let Some(values) = property.acceptable_values.as_ref() else {
        return Vec::new();
    };
    let fold = |s: String| if property.matches_case() { s } else { s.to_lowercase() };
    let accepted: HashSet<String> = values.iter().cloned().map(fold).collect();

    let per_row: Vec<Diagnostic> = view
        .column_cells(column)
        .filter(|(_, cell)| !view.is_exempt(cell))
        .filter(|(_, cell)| !accepted.contains(&fold(cell.to_string())))
        .map(|(row, _)| {
            cell_finding(
                Severity::Fail,
                CheckKind::AcceptableValues,
                column,
                row,
                "does not match any of the acceptable values in the configuration file",
            )
        })
        .collect();

    collapse(per_row, view.data_rows(), || {
        Diagnostic::fail(
            CheckKind::AcceptableValues,
            format!("Values in column {} are not any of the acceptable values", column.letters),
        )
        .with_column(column.letters.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MissingValue, PropertyType};
    use crate::layout::{DataExtent, SheetLayout};
    use crate::sheet::{CellValue, Grid};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn property(name: &str) -> PropertySpec {
        PropertySpec {
            name: name.into(),
            column: "B".into(),
            kind: None,
            required: None,
            hard_limits: None,
            soft_limits: None,
            acceptable_values: None,
            match_case: None,
        }
    }

    fn column_b() -> ColumnRef {
        ColumnRef::from_letters("B").unwrap()
    }

    /// One header row `proxy | <title>` followed by `values` in column B.
    fn sheet(title: &str, values: Vec<CellValue>) -> (Grid, SheetLayout) {
        let data_rows = values.len();
        let mut rows = vec![vec![text("proxy"), text(title)]];
        rows.extend(values.into_iter().map(|v| vec![text("boron"), v]));
        (Grid::from_rows(rows), SheetLayout::new(1, DataExtent { data_rows, gaps: 0 }))
    }

    #[test]
    fn test_name_case_insensitive_by_default() {
        let (grid, layout) = sheet("CO2 (ppm)", vec![]);
        let view = SheetView::new(&grid, layout, None);

        assert_eq!(check_name(&view, &property("co2 (ppm)"), &column_b()), None);

        let strict = PropertySpec { match_case: Some(true), ..property("co2 (ppm)") };
        let finding = check_name(&view, &strict, &column_b()).unwrap();
        assert_eq!(finding.message, "The title of column B should be _'co2 (ppm)'_ but is _'CO2 (ppm)'_");
    }

    #[test]
    fn test_required_flags_each_missing_row() {
        let values = vec![
            CellValue::Number(1.0),
            CellValue::Number(2.0),
            CellValue::Number(3.0),
            text("NA"),
            CellValue::Number(5.0),
        ];
        let (grid, layout) = sheet("value", values);
        let missing = MissingValue::Text("NA".into());
        let view = SheetView::new(&grid, layout, Some(&missing));
        let required = PropertySpec { required: Some(true), ..property("value") };

        let findings = check_required(&view, &required, &column_b());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].row, Some(5));
        assert_eq!(findings[0].severity, Severity::Fail);
        assert_eq!(findings[0].message, "The value in B5 is missing but required");
    }

    #[test]
    fn test_required_ignores_optional_columns() {
        let (grid, layout) = sheet("value", vec![text("NA")]);
        let missing = MissingValue::Text("NA".into());
        let view = SheetView::new(&grid, layout, Some(&missing));

        assert!(check_required(&view, &property("value"), &column_b()).is_empty());
    }

    #[test]
    fn test_type_per_row_and_exempt() {
        let values = vec![CellValue::Number(1.0), text("NA"), text("oops"), CellValue::Number(4.0)];
        let (grid, layout) = sheet("value", values);
        let missing = MissingValue::Text("NA".into());
        let view = SheetView::new(&grid, layout, Some(&missing));
        let numeric = PropertySpec { kind: Some(PropertyType::Numeric), ..property("value") };

        let result = check_type(&view, &numeric, &column_b());

        assert!(!result.passed);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].message, "The value in B4 should be a numeric but is a text");
    }

    #[test]
    fn test_type_all_rows_failing_collapses() {
        let (grid, layout) = sheet("doi", vec![CellValue::Number(10.1), CellValue::Number(10.2)]);
        let view = SheetView::new(&grid, layout, None);
        let doi = PropertySpec { kind: Some(PropertyType::Doi), ..property("doi") };

        let result = check_type(&view, &doi, &column_b());

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].row, None);
        assert_eq!(result.diagnostics[0].message, "Values in column B should be a DOI but are numeric");
    }

    #[test]
    fn test_type_passes_silently() {
        let (grid, layout) = sheet("ref", vec![text("Smith 2020"), text("Jones 2019")]);
        let view = SheetView::new(&grid, layout, None);
        let reference = PropertySpec { kind: Some(PropertyType::Reference), ..property("ref") };

        let result = check_type(&view, &reference, &column_b());
        assert!(result.passed);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_hard_limit_boundary_is_inclusive() {
        let (grid, layout) = sheet("value", vec![CellValue::Number(-1.0), CellValue::Number(0.0), CellValue::Number(7.0)]);
        let view = SheetView::new(&grid, layout, None);
        let limited = PropertySpec {
            hard_limits: Some(Limits { min: Some(0.0), max: None }),
            ..property("value")
        };

        let findings = check_hard_limits(&view, &limited, &column_b());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].row, Some(2));
        assert_eq!(findings[0].message, "The value in B2 is less than the specified minimum");
    }

    #[test]
    fn test_hard_limits_all_outside() {
        let (grid, layout) = sheet("value", vec![CellValue::Number(11.0), CellValue::Number(12.0)]);
        let view = SheetView::new(&grid, layout, None);
        let limited = PropertySpec {
            hard_limits: Some(Limits { min: None, max: Some(10.0) }),
            ..property("value")
        };

        let findings = check_hard_limits(&view, &limited, &column_b());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Values in column B are all outside the specified limits");
    }

    #[test]
    fn test_soft_limits_warn() {
        let (grid, layout) = sheet("value", vec![CellValue::Number(5.0), CellValue::Number(500.0)]);
        let view = SheetView::new(&grid, layout, None);
        let limited = PropertySpec {
            soft_limits: Some(Limits { min: Some(0.0), max: Some(100.0) }),
            ..property("value")
        };

        let findings = check_soft_limits(&view, &limited, &column_b());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warn);
        assert_eq!(findings[0].message, "The value in B3 is more than the suggested maximum");
    }

    #[test]
    fn test_numeric_sentinel_is_exempt_from_limits() {
        let (grid, layout) = sheet("value", vec![CellValue::Number(-999.0), CellValue::Number(12.0)]);
        let missing = MissingValue::Number(-999.0);
        let view = SheetView::new(&grid, layout, Some(&missing));
        let limited = PropertySpec {
            hard_limits: Some(Limits { min: Some(0.0), max: None }),
            soft_limits: Some(Limits { min: Some(10.0), max: Some(100.0) }),
            ..property("value")
        };

        assert!(check_hard_limits(&view, &limited, &column_b()).is_empty());
        assert!(check_soft_limits(&view, &limited, &column_b()).is_empty());

        let unexempt = SheetView::new(&grid, layout, None);
        let findings = check_hard_limits(&unexempt, &limited, &column_b());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].row, Some(2));
    }

    #[test]
    fn test_acceptable_values_case_handling() {
        let (grid, layout) = sheet("group", vec![text("foram"), text("Coral")]);
        let view = SheetView::new(&grid, layout, None);

        let loose = PropertySpec {
            acceptable_values: Some(vec!["Foram".into(), "Coral".into()]),
            match_case: Some(false),
            ..property("group")
        };
        assert!(check_acceptable_values(&view, &loose, &column_b()).is_empty());

        let strict = PropertySpec { match_case: Some(true), ..loose };
        let findings = check_acceptable_values(&view, &strict, &column_b());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].row, Some(2));
    }

    #[test]
    fn test_acceptable_values_skip_exempt() {
        let (grid, layout) = sheet("group", vec![text("NA"), text("Foram")]);
        let missing = MissingValue::Text("NA".into());
        let view = SheetView::new(&grid, layout, Some(&missing));
        let restricted = PropertySpec {
            acceptable_values: Some(vec!["Foram".into()]),
            ..property("group")
        };

        assert!(check_acceptable_values(&view, &restricted, &column_b()).is_empty());
    }
}

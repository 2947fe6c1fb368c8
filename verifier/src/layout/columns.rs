//! Binding configured properties to sheet columns.

use tracing::warn;

use crate::config::{ColumnSpec, PropertySpec};
use crate::report::{CheckKind, Diagnostic};
use crate::sheet::{index_to_letters, letters_to_index, CellValue, GridSource};

/// A concrete column: its letters and zero-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub letters: String,
    pub index: usize,
}

impl ColumnRef {
    pub fn from_index(index: usize) -> Self {
        Self {
            letters: index_to_letters(index),
            index,
        }
    }

    pub fn from_letters(letters: &str) -> Option<Self> {
        letters_to_index(letters).map(|index| Self {
            letters: letters.to_string(),
            index,
        })
    }
}

/// Index of the first column whose cell in `title_row` is exactly `name`.
pub fn find_header(grid: &dyn GridSource, title_row: usize, name: &str) -> Option<usize> {
    (0..grid.width()).find(|&col| matches!(grid.cell(title_row, col), Some(CellValue::Text(ref s)) if s == name))
}

/// Resolve one property. `?` columns are looked up by header text in the
/// last header row; literal letters are taken as given.
pub fn resolve_column(property: &PropertySpec, grid: &dyn GridSource, header_rows: usize) -> Option<ColumnRef> {
    match property.column_spec() {
        ColumnSpec::Letters(letters) => ColumnRef::from_letters(&letters),
        ColumnSpec::Unknown => {
            let title_row = header_rows.checked_sub(1)?;
            find_header(grid, title_row, &property.name).map(ColumnRef::from_index)
        }
    }
}

/// Per-file binding of each configured property (by position in the
/// configuration) to its column, or `None` when it could not be found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBindings {
    columns: Vec<Option<ColumnRef>>,
}

impl ColumnBindings {
    /// Resolve every property; unresolved ones get a "header not found" note.
    pub fn resolve(properties: &[PropertySpec], grid: &dyn GridSource, header_rows: usize) -> (Self, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let columns = properties
            .iter()
            .map(|property| {
                let resolved = resolve_column(property, grid, header_rows);
                if resolved.is_none() {
                    warn!(property = %property.name, "header not found");
                    diagnostics.push(Diagnostic::info(
                        CheckKind::ColumnLookup,
                        format!("Could not find header '_{}_'", property.name),
                    ));
                }
                resolved
            })
            .collect();

        (Self { columns }, diagnostics)
    }

    pub fn get(&self, property: usize) -> Option<&ColumnRef> {
        self.columns.get(property).and_then(Option::as_ref)
    }

    /// Resolved properties in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ColumnRef)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(i, column)| column.as_ref().map(|c| (i, c)))
    }

    pub fn resolved_count(&self) -> usize {
        self.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Grid;

    fn property(name: &str, column: &str) -> PropertySpec {
        PropertySpec {
            name: name.into(),
            column: column.into(),
            kind: None,
            required: None,
            hard_limits: None,
            soft_limits: None,
            acceptable_values: None,
            match_case: None,
        }
    }

    fn sheet() -> Grid {
        let text = |s: &str| CellValue::Text(s.into());
        Grid::from_rows(vec![
            vec![text("Compiled by"), CellValue::Empty, CellValue::Empty],
            vec![text("proxy"), text("age"), text("co2")],
            vec![text("boron"), CellValue::Number(1.2), CellValue::Number(410.0)],
        ])
    }

    #[test]
    fn test_unknown_column_found_by_header() {
        let grid = sheet();
        let resolved = resolve_column(&property("co2", "?"), &grid, 2).unwrap();
        assert_eq!(resolved, ColumnRef { letters: "C".into(), index: 2 });
    }

    #[test]
    fn test_header_lookup_is_literal() {
        let grid = sheet();
        assert_eq!(resolve_column(&property("CO2", "?"), &grid, 2), None);
        assert_eq!(resolve_column(&property(" co2", "?"), &grid, 2), None);
    }

    #[test]
    fn test_literal_letters_kept_verbatim() {
        let grid = sheet();
        let resolved = resolve_column(&property("anything", "AB"), &grid, 2).unwrap();
        assert_eq!(resolved, ColumnRef { letters: "AB".into(), index: 27 });
    }

    #[test]
    fn test_bindings_skip_unresolved() {
        let grid = sheet();
        let properties = vec![property("proxy", "A"), property("depth", "?"), property("age", "?")];

        let (bindings, diagnostics) = ColumnBindings::resolve(&properties, &grid, 2);

        assert_eq!(bindings.get(1), None);
        assert_eq!(bindings.get(2).map(|c| c.letters.as_str()), Some("B"));
        assert_eq!(bindings.resolved_count(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("_depth_"));
    }
}

//! The per-column check battery.
//!
//! For each resolved property, in configuration order:
//!
//! 1. name - header text matches the property name
//! 2. required - no missing-value sentinel in a required column
//! 3. type - cells are stored as the declared type
//! 4. hard limits, soft limits, acceptable values - only when the type
//!    check passed (the *type gate*)
//!
//! A cell equal to the missing-value sentinel is *exempt*: every content
//! check skips it, and only the required check looks at it.

pub mod checks;

use tracing::debug;

use crate::config::{MissingValue, PropertySpec};
use crate::layout::{ColumnBindings, ColumnRef, SheetLayout};
use crate::report::{CheckKind, Diagnostic};
use crate::sheet::{CellValue, GridSource};

pub use checks::{
    check_acceptable_values, check_hard_limits, check_name, check_required, check_soft_limits, check_type,
    TypeCheck,
};

/// Read access to the data region of one sheet.
pub struct SheetView<'a> {
    grid: &'a dyn GridSource,
    layout: SheetLayout,
    missing: Option<&'a MissingValue>,
}

impl<'a> SheetView<'a> {
    pub fn new(grid: &'a dyn GridSource, layout: SheetLayout, missing: Option<&'a MissingValue>) -> Self {
        Self { grid, layout, missing }
    }

    pub fn layout(&self) -> SheetLayout {
        self.layout
    }

    pub fn data_rows(&self) -> usize {
        self.layout.data_rows
    }

    /// The title cell of a column.
    pub fn title(&self, column: &ColumnRef) -> CellValue {
        self.grid
            .cell(self.layout.title_row(), column.index)
            .unwrap_or(CellValue::Empty)
    }

    /// The `offset`-th data cell of a column; cells outside the grid read as empty.
    pub fn data_cell(&self, offset: usize, column: &ColumnRef) -> CellValue {
        self.grid
            .cell(self.layout.grid_row(offset), column.index)
            .unwrap_or(CellValue::Empty)
    }

    /// Every data cell of a column with its 1-based sheet row.
    pub fn column_cells<'b>(&'b self, column: &'b ColumnRef) -> impl Iterator<Item = (usize, CellValue)> + 'b {
        (0..self.layout.data_rows).map(move |offset| (self.layout.sheet_row(offset), self.data_cell(offset, column)))
    }

    /// Whether a cell holds the missing-value sentinel.
    pub fn is_exempt(&self, cell: &CellValue) -> bool {
        self.missing.is_some_and(|missing| missing.matches(cell))
    }
}

/// Which properties passed their type check, by configuration position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeGates {
    open: Vec<bool>,
}

impl TypeGates {
    pub fn is_open(&self, property: usize) -> bool {
        self.open.get(property).copied().unwrap_or(false)
    }
}

/// What the rule engine found in one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub gates: TypeGates,
}

/// Runs the check battery over every resolved property.
pub struct RuleEngine<'a> {
    properties: &'a [PropertySpec],
}

impl<'a> RuleEngine<'a> {
    pub fn new(properties: &'a [PropertySpec]) -> Self {
        Self { properties }
    }

    pub fn run(&self, view: &SheetView<'_>, bindings: &ColumnBindings) -> RuleOutcome {
        let mut outcome = RuleOutcome {
            diagnostics: Vec::new(),
            gates: TypeGates {
                open: vec![false; self.properties.len()],
            },
        };

        for (index, column) in bindings.iter() {
            let property = &self.properties[index];

            outcome.diagnostics.extend(check_name(view, property, column));
            outcome.diagnostics.extend(check_required(view, property, column));

            let type_check = check_type(view, property, column);
            outcome.diagnostics.extend(type_check.diagnostics);

            if type_check.passed {
                outcome.gates.open[index] = true;
                outcome.diagnostics.extend(check_hard_limits(view, property, column));
                outcome.diagnostics.extend(check_soft_limits(view, property, column));
                outcome.diagnostics.extend(check_acceptable_values(view, property, column));
            } else {
                debug!(property = %property.name, column = %column.letters, "type gate closed");
                outcome.diagnostics.push(
                    Diagnostic::info(
                        CheckKind::TypeGate,
                        "Could not perform further checks because variable is of incorrect type",
                    )
                    .with_column(column.letters.clone()),
                );
            }
        }

        outcome
    }
}

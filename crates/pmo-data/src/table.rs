//! In-memory columnar table model.
//!
//! A [`Table`] is a named header plus rows of [`Value`] cells. Tables are
//! treated as immutable snapshots after load; every transformation produces
//! a new table.

use std::collections::HashMap;

use pmo_core::value::Value;

/// A loaded or derived table: named columns over rows of typed cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column headers.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            name: name.into(),
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Convenience constructor from string slices, for derived tables and tests.
    pub fn with_columns(name: &str, columns: &[&str]) -> Self {
        Self::new(name, columns.iter().map(|c| c.to_string()).collect())
    }

    /// Logical table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column headers in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column`, or `None` if the table does not carry it.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// `true` when every named column is present.
    pub fn has_columns(&self, columns: &[&str]) -> bool {
        columns.iter().all(|c| self.index.contains_key(*c))
    }

    /// Append a row, padding or truncating to the header width.
    ///
    /// Ragged CSV rows are tolerated here so a single malformed line never
    /// poisons the rest of the table.
    pub fn push_row(&mut self, mut cells: Vec<Value>) {
        let width = self.columns.len();
        if cells.len() < width {
            cells.resize(width, Value::Absent);
        } else {
            cells.truncate(width);
        }
        self.rows.push(cells);
    }

    /// Borrow all rows.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Cell at (`row`, `column`), or `None` when either is out of range.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Numeric cell view with the absent-as-zero fill applied.
    pub fn num(&self, row: usize, column: &str) -> f64 {
        self.get(row, column).map(Value::number_or_zero).unwrap_or(0.0)
    }

    /// Textual cell view via [`Value::label`]; empty string when missing.
    pub fn text(&self, row: usize, column: &str) -> String {
        self.get(row, column).map(Value::label).unwrap_or_default()
    }

    /// Sum of a numeric column across all rows (absent counts as zero).
    pub fn sum_column(&self, column: &str) -> f64 {
        let Some(idx) = self.column_index(column) else {
            return 0.0;
        };
        self.rows.iter().map(|r| r[idx].number_or_zero()).sum()
    }

    /// Mean of a numeric column, `0.0` for an empty table.
    pub fn mean_column(&self, column: &str) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.sum_column(column) / self.rows.len() as f64
    }

    /// Rows matching a predicate, as a new table with the same header.
    pub fn filtered(&self, pred: impl Fn(&Table, usize) -> bool) -> Table {
        let mut out = Table::new(self.name.clone(), self.columns.clone());
        for i in 0..self.rows.len() {
            if pred(self, i) {
                out.rows.push(self.rows[i].clone());
            }
        }
        out
    }

    /// Distinct non-empty labels of a column, sorted ascending.
    pub fn distinct_labels(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut labels: Vec<String> = self
            .rows
            .iter()
            .map(|r| r[idx].label())
            .filter(|l| !l.is_empty())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Copy of this table with an extra column computed per row.
    pub fn with_derived_column(
        &self,
        column: &str,
        f: impl Fn(&Table, usize) -> Value,
    ) -> Table {
        let mut columns = self.columns.clone();
        columns.push(column.to_string());
        let mut out = Table::new(self.name.clone(), columns);
        for i in 0..self.rows.len() {
            let mut row = self.rows[i].clone();
            row.push(f(self, i));
            out.rows.push(row);
        }
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

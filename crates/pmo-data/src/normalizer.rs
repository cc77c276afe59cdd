//! Schema-driven type coercion (the ETL step).
//!
//! For each column the schema types, cells are converted to their semantic
//! type. Conversion failures produce [`Value::Absent`], never an error.
//! Money/quantity/percent columns then resolve `Absent` to zero so sums never
//! propagate an unknown, and money/quantity values clamp to non-negative.
//! The whole pass is idempotent: already-coerced cells pass through unchanged.

use pmo_core::schema::{self, ColumnKind};
use pmo_core::value::{self, Value};
use tracing::debug;

use crate::loader::DataSet;
use crate::table::Table;

/// Normalize one table according to its schema entry.
///
/// Tables without a schema entry (or derived tables) are returned as-is.
pub fn normalize(table: &Table) -> Table {
    let Some(table_schema) = schema::table(table.name()) else {
        return table.clone();
    };

    let mut out = Table::new(table.name().to_string(), table.columns().to_vec());
    let kinds: Vec<Option<ColumnKind>> = table
        .columns()
        .iter()
        .map(|c| {
            table_schema
                .typed_columns
                .iter()
                .find(|(name, _)| name == c)
                .map(|(_, kind)| *kind)
        })
        .collect();

    let mut failed_cells = 0u64;
    for row in table.rows() {
        let cells = row
            .iter()
            .zip(kinds.iter())
            .map(|(cell, kind)| match kind {
                Some(k) => {
                    let coerced = coerce(cell, *k);
                    if coerced.is_absent() && !cell.is_absent() && !is_blank(cell) {
                        failed_cells += 1;
                    }
                    apply_fill(coerced, *k)
                }
                None => cell.clone(),
            })
            .collect();
        out.push_row(cells);
    }

    if failed_cells > 0 {
        debug!(
            "Normalized {}: {} unparseable cells marked absent",
            table.name(),
            failed_cells
        );
    }

    out
}

/// Normalize every table in a [`DataSet`] in place of the raw ones.
pub fn normalize_dataset(dataset: DataSet) -> DataSet {
    let DataSet { tables, report } = dataset;
    let tables = tables
        .into_iter()
        .map(|(name, table)| {
            let normalized = normalize(&table);
            (name, normalized)
        })
        .collect();
    DataSet { tables, report }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_blank(cell: &Value) -> bool {
    matches!(cell, Value::Text(s) if s.trim().is_empty())
}

/// Convert a single cell toward `kind`, producing `Absent` on failure.
///
/// Already-typed cells are passed through untouched, which is what makes the
/// pass idempotent.
fn coerce(cell: &Value, kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::Date => match cell {
            Value::Date(_) => cell.clone(),
            Value::Text(s) => value::parse_date(s).map(Value::Date).unwrap_or(Value::Absent),
            _ => Value::Absent,
        },
        ColumnKind::Money | ColumnKind::Quantity | ColumnKind::Percent => match cell {
            Value::Number(_) => cell.clone(),
            Value::Text(s) => value::parse_number(s)
                .map(Value::Number)
                .unwrap_or(Value::Absent),
            Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
            _ => Value::Absent,
        },
        ColumnKind::Flag => match cell {
            Value::Bool(_) => cell.clone(),
            Value::Text(s) => value::parse_bool(s).map(Value::Bool).unwrap_or(Value::Absent),
            Value::Number(n) => Value::Bool(*n != 0.0),
            _ => Value::Absent,
        },
    }
}

/// Resolve the fill rule for the coerced cell.
fn apply_fill(cell: Value, kind: ColumnKind) -> Value {
    match cell {
        Value::Absent if kind.fills_zero() => Value::Number(0.0),
        Value::Number(n) if kind.clamps_negative() && n < 0.0 => Value::Number(0.0),
        other => other,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

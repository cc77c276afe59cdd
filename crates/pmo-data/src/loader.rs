//! CSV table discovery and loading.
//!
//! Reads the fixed set of schema tables from a data directory into raw
//! [`Table`]s. A missing file is reported and skipped, never fatal; a missing
//! required column keeps the table loaded but is recorded so dependent KPIs
//! can report "unavailable" instead of computing garbage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pmo_core::error::AnalyticsError;
use pmo_core::schema::{self, TableSchema};
use pmo_core::value::Value;
use tracing::{debug, info, warn};

use crate::table::Table;

// ── LoadReport ────────────────────────────────────────────────────────────────

/// Row count bookkeeping for one successfully loaded table.
#[derive(Debug, Clone)]
pub struct TableLoad {
    pub name: String,
    pub rows: usize,
}

/// What the loader found, what it did not, and which contracts were broken.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Tables read from disk, with their row counts.
    pub loaded: Vec<TableLoad>,
    /// Logical names whose backing file was absent, with the path probed.
    pub missing_files: Vec<(String, PathBuf)>,
    /// `(table, column)` pairs for required columns absent from the header.
    pub missing_columns: Vec<(String, String)>,
}

impl LoadReport {
    /// `true` when every schema table was found with its required columns.
    pub fn is_clean(&self) -> bool {
        self.missing_files.is_empty() && self.missing_columns.is_empty()
    }

    /// One-line human summary for footers and logs.
    pub fn summary(&self) -> String {
        if self.is_clean() {
            format!("{} tables loaded", self.loaded.len())
        } else {
            let mut parts = vec![format!("{} tables loaded", self.loaded.len())];
            if !self.missing_files.is_empty() {
                let names: Vec<&str> = self.missing_files.iter().map(|(n, _)| n.as_str()).collect();
                parts.push(format!("missing: {}", names.join(", ")));
            }
            for (table, column) in &self.missing_columns {
                parts.push(format!("{} lacks {}", table, column));
            }
            parts.join("; ")
        }
    }

    /// The load issues as typed errors, for callers that want the taxonomy.
    pub fn errors(&self) -> Vec<AnalyticsError> {
        let mut out: Vec<AnalyticsError> = self
            .missing_files
            .iter()
            .map(|(table, path)| AnalyticsError::MissingFile {
                table: table.clone(),
                path: path.clone(),
            })
            .collect();
        out.extend(
            self.missing_columns
                .iter()
                .map(|(table, column)| AnalyticsError::MissingColumn {
                    table: table.clone(),
                    column: column.clone(),
                }),
        );
        out
    }
}

// ── DataSet ───────────────────────────────────────────────────────────────────

/// All loaded tables keyed by logical name, plus the load report.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub tables: HashMap<String, Table>,
    pub report: LoadReport,
}

impl DataSet {
    /// Borrow a table by logical name, `None` when its file was missing.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// `true` when `name` is loaded and carries every listed column.
    ///
    /// This is the availability gate consulted before each KPI computation.
    pub fn has_columns(&self, name: &str, columns: &[&str]) -> bool {
        self.tables
            .get(name)
            .map(|t| t.has_columns(columns))
            .unwrap_or(false)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load every schema table found under `dir`.
///
/// Cells are read as raw text; type coercion is the normalizer's job. Rows
/// that fail CSV parsing are skipped with a debug log rather than failing
/// the table.
pub fn load_tables(dir: &Path) -> DataSet {
    let mut dataset = DataSet::default();

    for table_schema in schema::TABLES {
        let path = dir.join(table_schema.file);
        if !path.exists() {
            let err = AnalyticsError::MissingFile {
                table: table_schema.name.to_string(),
                path: path.clone(),
            };
            warn!("{}", err);
            dataset
                .report
                .missing_files
                .push((table_schema.name.to_string(), path));
            continue;
        }

        match read_csv_table(table_schema, &path) {
            Ok(table) => {
                check_required_columns(table_schema, &table, &mut dataset.report);
                info!(
                    "Loaded {}: {} rows, {} columns",
                    table_schema.name,
                    table.len(),
                    table.columns().len()
                );
                dataset.report.loaded.push(TableLoad {
                    name: table_schema.name.to_string(),
                    rows: table.len(),
                });
                dataset.tables.insert(table_schema.name.to_string(), table);
            }
            Err(e) => {
                warn!(
                    "Failed to read table '{}' from {}: {}",
                    table_schema.name,
                    path.display(),
                    e
                );
                dataset
                    .report
                    .missing_files
                    .push((table_schema.name.to_string(), path));
            }
        }
    }

    dataset
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_csv_table(table_schema: &TableSchema, path: &Path) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut table = Table::new(table_schema.name, columns);

    let mut rows_read = 0u64;
    let mut rows_skipped = 0u64;
    for record in reader.records() {
        match record {
            Ok(rec) => {
                let cells: Vec<Value> = rec.iter().map(|c| Value::Text(c.to_string())).collect();
                table.push_row(cells);
                rows_read += 1;
            }
            Err(e) => {
                debug!("Skipping malformed row in {}: {}", path.display(), e);
                rows_skipped += 1;
            }
        }
    }

    debug!(
        "File {}: {} rows read, {} skipped",
        path.display(),
        rows_read,
        rows_skipped
    );

    Ok(table)
}

fn check_required_columns(table_schema: &TableSchema, table: &Table, report: &mut LoadReport) {
    for required in table_schema.required_columns {
        if table.column_index(required).is_none() {
            let err = AnalyticsError::MissingColumn {
                table: table_schema.name.to_string(),
                column: required.to_string(),
            };
            warn!("{}", err);
            report
                .missing_columns
                .push((table_schema.name.to_string(), required.to_string()));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

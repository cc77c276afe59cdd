use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by PMO Analytics.
///
/// Cell-level parse failures and divide-by-zero conditions are deliberately
/// not represented here: they are recovered locally (absent marker / zero)
/// and never surface as errors. Load-time issues degrade the affected
/// tables; nothing aborts the run.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A table's backing file is absent. The table is marked unavailable
    /// and dependent computations are skipped, never aborted.
    #[error("Table '{table}' file not found: {path}")]
    MissingFile { table: String, path: PathBuf },

    /// A required column is absent; dependent KPIs become unavailable.
    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    /// Pass-through for raw I/O errors (report/config writes).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the workspace crates.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

//! Process-wide data cache.
//!
//! Tables are loaded and normalized once at startup and held for the rest of
//! the run; the invalidation rule is "never, within one run". Interactive
//! recomputation always reads from this store, so every figure across every
//! view is derived from the same snapshot.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pmo_data::loader::{self, DataSet, LoadReport};
use pmo_data::normalizer;
use pmo_data::table::Table;
use tracing::info;

/// The loaded, normalized snapshot all pipelines read from.
pub struct DataStore {
    dataset: DataSet,
    source_dir: PathBuf,
    loaded_at: DateTime<Utc>,
}

impl DataStore {
    /// Load every schema table under `dir` and normalize it.
    ///
    /// Missing files and broken column contracts are recorded in the report,
    /// never raised; an empty directory yields a store where every view
    /// renders as unavailable.
    pub fn load(dir: &Path) -> Self {
        let dataset = normalizer::normalize_dataset(loader::load_tables(dir));
        info!("Data store ready: {}", dataset.report.summary());
        Self {
            dataset,
            source_dir: dir.to_path_buf(),
            loaded_at: Utc::now(),
        }
    }

    /// Build a store from an already-assembled dataset (fixtures, tests).
    pub fn from_dataset(dataset: DataSet) -> Self {
        Self {
            dataset,
            source_dir: PathBuf::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Borrow a table by logical name, `None` when unavailable.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.dataset.table(name)
    }

    /// `true` when `name` is loaded and carries every listed column.
    pub fn has_columns(&self, name: &str, columns: &[&str]) -> bool {
        self.dataset.has_columns(name, columns)
    }

    /// The load report (found / missing / column issues).
    pub fn report(&self) -> &LoadReport {
        &self.dataset.report
    }

    /// Directory the snapshot was read from.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// When the snapshot was taken.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Loads the file-backed static mapping tables (spec section 6) once at
//! startup, from a single directory shared by the taxonomy, normalizer,
//! and synonym tables.

use std::path::{Path, PathBuf};

/// Default location, relative to the process's current working directory.
/// Overridable via `EQUISEARCH_DATA_DIR` for deployments that run from a
/// different root.
const DEFAULT_DATA_DIR: &str = "data";

fn data_dir() -> PathBuf {
    std::env::var("EQUISEARCH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Load every crate's static tables from the data directory. Safe to call
/// more than once per process: each crate's loader is itself idempotent
/// (backed by a `OnceLock`, first call wins).
pub fn load_static_tables() {
    load_static_tables_from(&data_dir());
}

fn load_static_tables_from(dir: &Path) {
    equisearch_core::taxonomy::load_overrides(dir);
    equisearch_normalize::load_data_overrides(dir);
    equisearch_retrieve::load_synonym_overrides(dir);
}

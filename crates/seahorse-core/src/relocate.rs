//! Moving data to a new storage root.
//!
//! Migration copies, it never moves: the old root is left intact so the user
//! can go back to it. A data file that already exists at the destination is
//! skipped rather than overwritten, which lets a user point Seahorse at a
//! folder that already holds a library (for example one synced from another
//! machine) without clobbering it.

use crate::paths::StorageLayout;
use crate::store::fs_backend::DATA_FILES;
use serde::Serialize;
use std::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationResult {
    pub migrated: Vec<String>,
    pub skipped: Vec<String>,
    /// `(file, error message)` for every copy that failed.
    pub errors: Vec<(String, String)>,
}

impl MigrationResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Copies the data files from `from` into `to`.
///
/// Files missing at the source are ignored. Files present at the destination
/// are reported as skipped. Per-file failures are collected, not returned early.
pub fn migrate_data(from: &StorageLayout, to: &StorageLayout) -> MigrationResult {
    let mut result = MigrationResult::default();
    let source_dir = from.data_dir();
    let target_dir = to.data_dir();

    if let Err(e) = fs::create_dir_all(&target_dir) {
        warn!(path = %target_dir.display(), error = %e, "Could not create data directory");
        for name in DATA_FILES {
            if source_dir.join(name).exists() {
                result.errors.push((name.to_string(), e.to_string()));
            }
        }
        return result;
    }

    for name in DATA_FILES {
        let source = source_dir.join(name);
        let target = target_dir.join(name);
        if !source.exists() {
            debug!(file = name, "Nothing to migrate");
            continue;
        }
        if target.exists() {
            debug!(file = name, "Destination already has this file, skipping");
            result.skipped.push(name.to_string());
            continue;
        }
        match fs::copy(&source, &target) {
            Ok(_) => result.migrated.push(name.to_string()),
            Err(e) => {
                warn!(file = name, error = %e, "Failed to migrate data file");
                result.errors.push((name.to_string(), e.to_string()));
            }
        }
    }

    info!(
        migrated = result.migrated.len(),
        skipped = result.skipped.len(),
        errors = result.errors.len(),
        "Data migration finished"
    );
    result
}

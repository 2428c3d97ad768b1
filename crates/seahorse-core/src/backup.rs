//! Compressed snapshots of the data collections.
//!
//! A backup is a `.tar.gz` in the `Backups/` directory holding one JSON file
//! per collection, taken from the store's current state:
//!
//! ```text
//! Backups/seahorse-20260108-101530.tar.gz
//! └── seahorse/
//!     ├── items.json
//!     ├── categories.json
//!     ├── tags.json
//!     └── preferences.json
//! ```
//!
//! After writing, older archives beyond the `keep` newest are deleted.
//! Image files are not included.

use crate::error::Result;
use crate::paths::StorageLayout;
use crate::store::fs_backend::{CATEGORIES_FILE, ITEMS_FILE, PREFERENCES_FILE, TAGS_FILE};
use crate::store::DataStore;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const PREFIX: &str = "seahorse-";
const SUFFIX: &str = ".tar.gz";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub archive: PathBuf,
    pub pruned: Vec<PathBuf>,
}

/// Writes a snapshot of `store` and prunes to the newest `keep` archives.
///
/// `keep == 0` disables pruning.
pub fn create_backup<S: DataStore>(
    store: &S,
    layout: &StorageLayout,
    keep: usize,
) -> Result<BackupReport> {
    let dir = layout.backups_dir();
    fs::create_dir_all(&dir)?;

    let entries = [
        (ITEMS_FILE, serde_json::to_vec_pretty(&store.fetch_all_items()?)?),
        (
            CATEGORIES_FILE,
            serde_json::to_vec_pretty(&store.fetch_all_categories()?)?,
        ),
        (TAGS_FILE, serde_json::to_vec_pretty(&store.fetch_all_tags()?)?),
        (
            PREFERENCES_FILE,
            serde_json::to_vec_pretty(&store.fetch_all_preferences()?)?,
        ),
    ];

    let archive = next_archive_path(&dir);
    let file = File::create(&archive)?;
    write_archive(file, &entries)?;
    info!(archive = %archive.display(), "Backup written");

    let pruned = if keep > 0 { prune(&dir, keep)? } else { Vec::new() };
    Ok(BackupReport { archive, pruned })
}

/// Archives in `Backups/`, newest first.
pub fn list_backups(layout: &StorageLayout) -> Result<Vec<PathBuf>> {
    list_archives(&layout.backups_dir())
}

fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut found: Vec<(SortKey, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(key) = sort_key(&path) {
            found.push((key, path));
        }
    }
    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

fn write_archive<W: Write>(writer: W, entries: &[(&str, Vec<u8>)]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(Utc::now().timestamp().max(0) as u64);
        header.set_cksum();

        tar.append_data(&mut header, format!("seahorse/{}", name), content.as_slice())?;
    }

    tar.into_inner()?.finish()?;
    Ok(())
}

fn next_archive_path(dir: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    let mut path = dir.join(format!("{}{}{}", PREFIX, stamp, SUFFIX));
    let mut counter = 1;
    while path.exists() {
        path = dir.join(format!("{}{}-{}{}", PREFIX, stamp, counter, SUFFIX));
        counter += 1;
    }
    path
}

/// (timestamp, same-second counter)
type SortKey = (String, u32);

fn sort_key(path: &Path) -> Option<SortKey> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    // stem is YYYYmmdd-HHMMSS or YYYYmmdd-HHMMSS-N
    let mut parts = stem.splitn(3, '-');
    let date = parts.next()?;
    let time = parts.next()?;
    let counter = match parts.next() {
        Some(n) => n.parse().ok()?,
        None => 0,
    };
    Some((format!("{}-{}", date, time), counter))
}

fn prune(dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let all = list_archives(dir)?;
    let mut pruned = Vec::new();
    for old in all.into_iter().skip(keep) {
        match fs::remove_file(&old) {
            Ok(()) => pruned.push(old),
            Err(e) => warn!(archive = %old.display(), error = %e, "Failed to prune backup"),
        }
    }
    Ok(pruned)
}

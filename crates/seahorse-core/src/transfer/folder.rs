//! Library export folders.
//!
//! An export is self-contained: item JSON refers to images by file name, and
//! those files travel in the folder's `Images/`. Importing reads the same
//! layout, tolerating missing category, tag and image data.

use crate::error::{Result, SeahorseError};
use crate::model::CollectionItem;
use crate::orchestrator::ItemOrchestrator;
use crate::paths::layout::ASSETS_DIR;
use crate::store::fs_backend::{CATEGORIES_FILE, ITEMS_FILE, PREFERENCES_FILE, TAGS_FILE};
use crate::store::DataStore;
use crate::taxonomy::{Category, Tag};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const EXPORT_PREFIX: &str = "Seahorse_Export_";
pub const DATA_DIR: &str = "Data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub directory: PathBuf,
    pub items: usize,
    pub categories: usize,
    pub tags: usize,
    pub images: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub items_added: usize,
    pub items_skipped: usize,
    pub categories_added: usize,
    pub categories_merged: usize,
    pub tags_added: usize,
    pub tags_merged: usize,
    pub images_copied: usize,
    /// Records that could not be stored. The rest of the import went ahead.
    pub errors: Vec<String>,
}

/// Writes the library into a new `Seahorse_Export_<date>` folder under `dest`.
///
/// Collections come from the cache, preferences from the store. A `-2`, `-3`
/// ... suffix is added when a folder for today already exists.
pub fn export_library<S: DataStore>(
    orch: &ItemOrchestrator<S>,
    dest: &Path,
) -> Result<ExportReport> {
    let directory = next_export_dir(dest);
    let data_dir = directory.join(DATA_DIR);
    fs::create_dir_all(&data_dir)?;

    let cache = orch.cache();
    write_json(&data_dir.join(ITEMS_FILE), cache.items())?;
    write_json(&data_dir.join(CATEGORIES_FILE), cache.categories())?;
    write_json(&data_dir.join(TAGS_FILE), cache.tags())?;
    write_json(&data_dir.join(PREFERENCES_FILE), &orch.preferences()?)?;

    let images = copy_missing_files(&orch.layout().assets_dir(), &directory.join(ASSETS_DIR))?;

    let report = ExportReport {
        directory,
        items: cache.items().len(),
        categories: cache.categories().len(),
        tags: cache.tags().len(),
        images,
    };
    info!(
        directory = %report.directory.display(),
        items = report.items,
        images = report.images,
        "Library exported"
    );
    Ok(report)
}

/// Merges an export folder into the open library.
///
/// Categories and tags matching an existing one by id or by name (case
/// insensitive) are not added again; imported items pointing at them are
/// re-pointed at the existing record. Items whose id is already present are
/// skipped. References to categories or tags the import does not know are
/// dropped. Images already in the assets directory are never overwritten.
///
/// Preferences in the folder are left alone.
pub fn import_library<S: DataStore>(
    orch: &mut ItemOrchestrator<S>,
    source: &Path,
) -> Result<ImportReport> {
    let data_dir = source.join(DATA_DIR);
    if !data_dir.is_dir() {
        return Err(SeahorseError::InvalidInput(format!(
            "{} has no {} directory",
            source.display(),
            DATA_DIR
        )));
    }
    let items_file = data_dir.join(ITEMS_FILE);
    if !items_file.is_file() {
        return Err(SeahorseError::InvalidInput(format!("{} is missing", items_file.display())));
    }

    let items: Vec<CollectionItem> = read_json(&items_file)?;
    let categories: Vec<Category> = read_optional(&data_dir.join(CATEGORIES_FILE))?;
    let tags: Vec<Tag> = read_optional(&data_dir.join(TAGS_FILE))?;

    let images_copied = copy_missing_files(&source.join(ASSETS_DIR), &orch.layout().assets_dir())?;
    let mut report = ImportReport {
        images_copied,
        ..Default::default()
    };

    let category_ids = merge_categories(orch, categories, &mut report);
    let tag_ids = merge_tags(orch, tags, &mut report);
    for item in items {
        merge_item(orch, item, &category_ids, &tag_ids, &mut report);
    }

    info!(
        source = %source.display(),
        added = report.items_added,
        skipped = report.items_skipped,
        errors = report.errors.len(),
        "Library imported"
    );
    Ok(report)
}

/// Maps each imported category id to its id in this library.
fn merge_categories<S: DataStore>(
    orch: &mut ItemOrchestrator<S>,
    categories: Vec<Category>,
    report: &mut ImportReport,
) -> HashMap<Uuid, Uuid> {
    let mut ids = HashMap::new();
    for category in categories {
        let cache = orch.cache();
        let existing = cache
            .category(&category.id)
            .or_else(|| cache.category_by_name(&category.name))
            .map(|c| c.id);
        if let Some(existing) = existing {
            ids.insert(category.id, existing);
            report.categories_merged += 1;
            continue;
        }

        let imported = category.id;
        match orch.add_category(category) {
            Ok(added) => {
                ids.insert(imported, added.id);
                report.categories_added += 1;
            }
            Err(e) => {
                warn!(id = %imported, error = %e, "Skipping imported category");
                report.errors.push(format!("category {}: {}", imported, e));
            }
        }
    }
    ids
}

/// Maps each imported tag id to its id in this library.
fn merge_tags<S: DataStore>(
    orch: &mut ItemOrchestrator<S>,
    tags: Vec<Tag>,
    report: &mut ImportReport,
) -> HashMap<Uuid, Uuid> {
    let mut ids = HashMap::new();
    for tag in tags {
        let cache = orch.cache();
        let existing = cache
            .tag(&tag.id)
            .or_else(|| cache.tag_by_name(&tag.name))
            .map(|t| t.id);
        if let Some(existing) = existing {
            ids.insert(tag.id, existing);
            report.tags_merged += 1;
            continue;
        }

        let imported = tag.id;
        match orch.add_tag(tag) {
            Ok(added) => {
                ids.insert(imported, added.id);
                report.tags_added += 1;
            }
            Err(e) => {
                warn!(id = %imported, error = %e, "Skipping imported tag");
                report.errors.push(format!("tag {}: {}", imported, e));
            }
        }
    }
    ids
}

fn merge_item<S: DataStore>(
    orch: &mut ItemOrchestrator<S>,
    mut item: CollectionItem,
    category_ids: &HashMap<Uuid, Uuid>,
    tag_ids: &HashMap<Uuid, Uuid>,
    report: &mut ImportReport,
) {
    let id = item.id();
    let cache = orch.cache();
    if cache.item(&id).is_some() {
        debug!(id = %id, "Item already in library");
        report.items_skipped += 1;
        return;
    }

    let meta = item.meta_mut();
    if let Some(old) = meta.category_id {
        let resolved = category_ids
            .get(&old)
            .copied()
            .or_else(|| cache.category(&old).map(|c| c.id));
        if resolved.is_none() {
            warn!(id = %id, category = %old, "Dropping unknown category from imported item");
        }
        meta.category_id = resolved;
    }

    let mut resolved_tags = Vec::with_capacity(meta.tag_ids.len());
    for old in &meta.tag_ids {
        let resolved = tag_ids
            .get(old)
            .copied()
            .or_else(|| cache.tag(old).map(|t| t.id));
        match resolved {
            Some(tag) if !resolved_tags.contains(&tag) => resolved_tags.push(tag),
            Some(_) => {}
            None => warn!(id = %id, tag = %old, "Dropping unknown tag from imported item"),
        }
    }
    meta.tag_ids = resolved_tags;

    match orch.add_item(item) {
        Ok(_) => report.items_added += 1,
        Err(e) => {
            warn!(id = %id, error = %e, "Skipping imported item");
            report.errors.push(format!("item {}: {}", id, e));
        }
    }
}

fn next_export_dir(dest: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y-%m-%d").to_string();
    let mut path = dest.join(format!("{}{}", EXPORT_PREFIX, stamp));
    let mut counter = 2;
    while path.exists() {
        path = dest.join(format!("{}{}-{}", EXPORT_PREFIX, stamp, counter));
        counter += 1;
    }
    path
}

/// Copies the regular files of `from` into `to`, leaving files that already
/// exist there untouched. A missing `from` copies nothing.
fn copy_missing_files(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Ok(0);
    }
    fs::create_dir_all(to)?;

    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = to.join(name);
        if target.exists() {
            debug!(path = %target.display(), "Image already present, keeping it");
            continue;
        }
        fs::copy(&path, &target)?;
        copied += 1;
    }
    Ok(copied)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn read_optional<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if path.exists() {
        read_json(path)
    } else {
        Ok(T::default())
    }
}

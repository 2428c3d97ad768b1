use super::backend::{Preferences, StorageBackend};
use crate::error::Result;
use crate::model::CollectionItem;
use crate::taxonomy::{Category, Tag};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ITEMS_FILE: &str = "items.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const TAGS_FILE: &str = "tags.json";
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Every file the store owns inside the data directory.
pub const DATA_FILES: [&str; 4] = [ITEMS_FILE, CATEGORIES_FILE, TAGS_FILE, PREFERENCES_FILE];

/// One JSON file per collection inside the data directory.
pub struct FsBackend {
    data_dir: PathBuf,
    pretty: bool,
}

impl FsBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            pretty: true,
        }
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;

        let content = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        // Atomic write
        let stem = file.trim_end_matches(".json");
        let tmp_file = self
            .data_dir
            .join(format!(".{}-{}.tmp", stem, Uuid::new_v4()));
        fs::write(&tmp_file, content)?;
        fs::rename(&tmp_file, self.data_dir.join(file))?;

        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load_items(&self) -> Result<Option<Vec<CollectionItem>>> {
        self.read_json(ITEMS_FILE)
    }

    fn save_items(&self, items: &[CollectionItem]) -> Result<()> {
        self.write_json(ITEMS_FILE, items)
    }

    fn load_categories(&self) -> Result<Option<Vec<Category>>> {
        self.read_json(CATEGORIES_FILE)
    }

    fn save_categories(&self, categories: &[Category]) -> Result<()> {
        self.write_json(CATEGORIES_FILE, categories)
    }

    fn load_tags(&self) -> Result<Option<Vec<Tag>>> {
        self.read_json(TAGS_FILE)
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.write_json(TAGS_FILE, tags)
    }

    fn load_preferences(&self) -> Result<Option<Preferences>> {
        self.read_json(PREFERENCES_FILE)
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.write_json(PREFERENCES_FILE, preferences)
    }

    fn describe(&self) -> String {
        self.data_dir.display().to_string()
    }
}

//! # Storage Layer
//!
//! This module defines the persistence contract for Seahorse. The [`DataStore`]
//! trait is what the cache and orchestrator talk to; anything that can durably
//! hold the four collections can implement it.
//!
//! ## Collections
//!
//! | Collection  | Shape                     | File               |
//! |-------------|---------------------------|--------------------|
//! | items       | ordered `CollectionItem`s | `items.json`       |
//! | categories  | ordered `Category`s       | `categories.json`  |
//! | tags        | ordered `Tag`s            | `tags.json`        |
//! | preferences | `key -> value` strings    | `preferences.json` |
//!
//! ## Write Semantics
//!
//! - Each mutation rewrites its whole collection. Nothing is patched in place,
//!   so an interrupted write can damage at most the one file being written.
//! - A successful save is visible to the next fetch without a flush.
//! - [`DataStore::force_save_all`] writes every collection regardless of
//!   whether it changed. It runs before the storage root is switched.
//!
//! ## Failures
//!
//! Writes fail with `DuplicateEntry` (id or name clash), `NotFound` (unknown
//! id) or an I/O-class error. A failed write leaves the store's view unchanged.
//!
//! ## Implementations
//!
//! - [`CollectionStore`] over a [`backend::StorageBackend`]:
//!   - [`fs_backend::FsBackend`]: JSON files in the `Data/` directory.
//!   - [`mem_backend::MemBackend`]: For testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/Data/
//! ├── items.json
//! ├── categories.json
//! ├── tags.json
//! └── preferences.json
//! ```

use crate::error::Result;
use crate::model::{Bookmark, CollectionItem};
use crate::taxonomy::{Category, Tag};
use uuid::Uuid;

pub mod backend;
pub mod collection_store;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::{Preferences, StorageBackend};
pub use collection_store::CollectionStore;

/// Abstract interface for item, category, tag and preference persistence.
pub trait DataStore {
    fn fetch_all_items(&self) -> Result<Vec<CollectionItem>>;

    fn fetch_all_categories(&self) -> Result<Vec<Category>>;

    fn fetch_all_tags(&self) -> Result<Vec<Tag>>;

    /// Fails with `DuplicateEntry` if an item with the same id exists.
    fn save_item(&mut self, item: &CollectionItem) -> Result<()>;

    /// Replaces the stored item with the same id. Fails with `NotFound` if absent.
    fn update_item(&mut self, item: &CollectionItem) -> Result<()>;

    fn delete_item(&mut self, id: &Uuid) -> Result<()>;

    /// Fails with `DuplicateEntry` if the name matches an existing category
    /// case-insensitively.
    fn save_category(&mut self, category: &Category) -> Result<()>;

    /// Same name rule as [`DataStore::save_category`], ignoring the category itself.
    fn update_category(&mut self, category: &Category) -> Result<()>;

    fn delete_category(&mut self, id: &Uuid) -> Result<()>;

    fn save_tag(&mut self, tag: &Tag) -> Result<()>;

    fn update_tag(&mut self, tag: &Tag) -> Result<()>;

    fn delete_tag(&mut self, id: &Uuid) -> Result<()>;

    /// Replaces the category collection with `categories`, in that order.
    fn reorder_categories(&mut self, categories: &[Category]) -> Result<()>;

    fn reorder_tags(&mut self, tags: &[Tag]) -> Result<()>;

    fn category_exists(&self, name: &str) -> bool;

    fn tag_exists(&self, name: &str) -> bool;

    fn preference(&self, key: &str) -> Result<Option<String>>;

    fn set_preference(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that is not set is not an error.
    fn delete_preference(&mut self, key: &str) -> Result<()>;

    fn fetch_all_preferences(&self) -> Result<Preferences>;

    /// Writes every collection to durable storage.
    fn force_save_all(&mut self) -> Result<()>;

    // --- Bookmark conveniences ---

    fn fetch_bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(self
            .fetch_all_items()?
            .into_iter()
            .filter_map(|item| match item {
                CollectionItem::Bookmark(b) => Some(b),
                _ => None,
            })
            .collect())
    }

    fn fetch_bookmarks_by_category(&self, category_id: &Uuid) -> Result<Vec<Bookmark>> {
        Ok(self
            .fetch_bookmarks()?
            .into_iter()
            .filter(|b| b.meta.category_id.as_ref() == Some(category_id))
            .collect())
    }

    fn fetch_bookmarks_by_tag(&self, tag_id: &Uuid) -> Result<Vec<Bookmark>> {
        Ok(self
            .fetch_bookmarks()?
            .into_iter()
            .filter(|b| b.meta.has_tag(tag_id))
            .collect())
    }

    fn fetch_favorite_bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(self
            .fetch_bookmarks()?
            .into_iter()
            .filter(|b| b.meta.is_favorite)
            .collect())
    }

    fn save_bookmark(&mut self, bookmark: &Bookmark) -> Result<()> {
        self.save_item(&CollectionItem::Bookmark(bookmark.clone()))
    }

    fn update_bookmark(&mut self, bookmark: &Bookmark) -> Result<()> {
        self.update_item(&CollectionItem::Bookmark(bookmark.clone()))
    }

    fn delete_bookmark(&mut self, id: &Uuid) -> Result<()> {
        self.delete_item(id)
    }
}

//! # Item Orchestrator
//!
//! The orchestrator is the **single write entry point**. UIs read from
//! [`ItemOrchestrator::cache`] and send every change through the methods here.
//!
//! ## Role and Responsibilities
//!
//! On top of the cache's write-through it enforces the rules that span more
//! than one collection:
//!
//! - **Bookmark view**: bookmarks added, edited or removed through any entry
//!   point show up identically in the item list and the bookmark list.
//! - **Asset cleanup**: deleting an image removes its file when, and only
//!   when, the file lives inside the managed `Images/` directory.
//! - **Names**: category and tag names are validated and checked for
//!   case-insensitive clashes before the store sees them.
//! - **References**: newly attached categories and tags must exist.
//!
//! ## Generic Over DataStore
//!
//! `ItemOrchestrator<S: DataStore>` works with any store:
//! - Production: `ItemOrchestrator<CollectionStore<FsBackend>>`
//! - Testing: `ItemOrchestrator<CollectionStore<MemBackend>>`
//!
//! ## Operation Modules
//!
//! - [`items`]: Polymorphic add/update/delete, favorites, asset cleanup
//! - [`bookmarks`]: Bookmark entry points, category/tag views, tag toggling
//! - [`taxonomy`]: Category and tag management

pub mod bookmarks;
pub mod items;
pub mod taxonomy;

use crate::cache::{CacheEvent, ItemCache};
use crate::error::Result;
use crate::paths::StorageLayout;
use crate::store::{DataStore, Preferences};
use crate::taxonomy::DEFAULT_COLOR;
use tokio::sync::broadcast;

/// Colors given to categories and tags created without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyDefaults {
    pub category_color: String,
    pub tag_color: String,
}

impl Default for TaxonomyDefaults {
    fn default() -> Self {
        Self {
            category_color: DEFAULT_COLOR.to_string(),
            tag_color: DEFAULT_COLOR.to_string(),
        }
    }
}

pub struct ItemOrchestrator<S: DataStore> {
    store: S,
    cache: ItemCache,
    layout: StorageLayout,
    defaults: TaxonomyDefaults,
}

impl<S: DataStore> ItemOrchestrator<S> {
    /// Wraps `store` and fills the cache from it.
    pub fn new(store: S, layout: StorageLayout) -> Self {
        let mut cache = ItemCache::new();
        cache.load_from(&store);
        Self {
            store,
            cache,
            layout,
            defaults: TaxonomyDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: TaxonomyDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Switches to `store` (usually opened at a new root) and reloads the
    /// cache from it. Existing subscribers stay attached and receive
    /// [`CacheEvent::Loaded`].
    pub fn reopen(&mut self, store: S, layout: StorageLayout, defaults: TaxonomyDefaults) {
        self.cache.load_from(&store);
        self.store = store;
        self.layout = layout;
        self.defaults = defaults;
    }

    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn defaults(&self) -> &TaxonomyDefaults {
        &self.defaults
    }

    /// Change feed. It survives [`reopen`](Self::reopen).
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    /// Writes every collection to disk.
    pub fn force_save_all(&mut self) -> Result<()> {
        self.store.force_save_all()
    }

    // --- Preferences ---

    pub fn preference(&self, key: &str) -> Result<Option<String>> {
        self.store.preference(key)
    }

    pub fn set_preference(&mut self, key: &str, value: &str) -> Result<()> {
        self.store.set_preference(key, value)
    }

    pub fn delete_preference(&mut self, key: &str) -> Result<()> {
        self.store.delete_preference(key)
    }

    pub fn preferences(&self) -> Result<Preferences> {
        self.store.fetch_all_preferences()
    }
}

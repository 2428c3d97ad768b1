//! # Reactive Cache
//!
//! [`ItemCache`] is the in-memory mirror of everything in the store and the
//! only place reads are served from. It is filled once by
//! [`ItemCache::load_from`] and after that changes only through its
//! write-through methods.
//!
//! ## Write-Through
//!
//! Every mutating method takes the store and follows the same order:
//!
//! 1. Write to the store. If that fails, return the error; the cache is untouched.
//! 2. Apply the change to the in-memory collections.
//! 3. Broadcast a [`CacheEvent`].
//!
//! Subscribers therefore only ever hear about changes that are both durable
//! and visible through the accessors.
//!
//! ## Bookmark View
//!
//! Bookmarks are kept twice: inside the generic item list and in a
//! bookmarks-only list. Both are updated in the same step, so an id is in one
//! exactly when it is a bookmark in the other, with identical content.
//!
//! ## Change Feed
//!
//! [`ItemCache::subscribe`] hands out a `tokio::sync::broadcast` receiver.
//! It works without a runtime through `try_recv`. Receivers that fall more
//! than the channel capacity behind miss events and get `Lagged`.

use crate::error::Result;
use crate::model::{Bookmark, CollectionItem, ItemKind};
use crate::store::DataStore;
use crate::taxonomy::{names_match, Category, Tag};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error};
use uuid::Uuid;

/// Events buffered per subscriber before it starts lagging.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CacheEvent {
    Loaded {
        items: usize,
        categories: usize,
        tags: usize,
    },
    ItemAdded {
        id: Uuid,
        kind: ItemKind,
    },
    ItemUpdated {
        id: Uuid,
        kind: ItemKind,
    },
    ItemRemoved {
        id: Uuid,
        kind: ItemKind,
    },
    CategoriesChanged,
    TagsChanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub items: usize,
    pub bookmarks: usize,
    pub images: usize,
    pub texts: usize,
    pub favorites: usize,
    pub categories: usize,
    pub tags: usize,
}

pub struct ItemCache {
    items: Vec<CollectionItem>,
    bookmarks: Vec<Bookmark>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    sender: broadcast::Sender<CacheEvent>,
}

impl Default for ItemCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            items: Vec::new(),
            bookmarks: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            sender,
        }
    }

    /// Replaces the cache contents with what the store holds.
    ///
    /// A collection that cannot be fetched is left empty and the error is logged.
    pub fn load_from<S: DataStore>(&mut self, store: &S) {
        self.items = store.fetch_all_items().unwrap_or_else(|e| {
            error!(error = %e, "Failed to load items");
            Vec::new()
        });
        self.categories = store.fetch_all_categories().unwrap_or_else(|e| {
            error!(error = %e, "Failed to load categories");
            Vec::new()
        });
        self.tags = store.fetch_all_tags().unwrap_or_else(|e| {
            error!(error = %e, "Failed to load tags");
            Vec::new()
        });
        self.rebuild_bookmarks();

        debug!(
            items = self.items.len(),
            bookmarks = self.bookmarks.len(),
            categories = self.categories.len(),
            tags = self.tags.len(),
            "Cache loaded"
        );
        self.emit(CacheEvent::Loaded {
            items: self.items.len(),
            categories: self.categories.len(),
            tags: self.tags.len(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn emit(&self, event: CacheEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    fn rebuild_bookmarks(&mut self) {
        self.bookmarks = self
            .items
            .iter()
            .filter_map(|i| i.as_bookmark().cloned())
            .collect();
    }

    // --- Reads ---

    pub fn items(&self) -> &[CollectionItem] {
        &self.items
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn item(&self, id: &Uuid) -> Option<&CollectionItem> {
        self.items.iter().find(|i| &i.id() == id)
    }

    pub fn bookmark(&self, id: &Uuid) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| &b.meta.id == id)
    }

    pub fn category(&self, id: &Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| names_match(&c.name, name))
    }

    pub fn tag(&self, id: &Uuid) -> Option<&Tag> {
        self.tags.iter().find(|t| &t.id == id)
    }

    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| names_match(&t.name, name))
    }

    /// Tags attached to `item`, in the item's order. Dangling ids are skipped.
    pub fn tags_for(&self, item: &CollectionItem) -> Vec<&Tag> {
        item.meta()
            .tag_ids
            .iter()
            .filter_map(|id| self.tag(id))
            .collect()
    }

    pub fn category_name_taken(&self, name: &str, excluding: Option<&Uuid>) -> bool {
        self.categories
            .iter()
            .any(|c| Some(&c.id) != excluding && names_match(&c.name, name))
    }

    pub fn tag_name_taken(&self, name: &str, excluding: Option<&Uuid>) -> bool {
        self.tags
            .iter()
            .any(|t| Some(&t.id) != excluding && names_match(&t.name, name))
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            items: self.items.len(),
            bookmarks: self.bookmarks.len(),
            categories: self.categories.len(),
            tags: self.tags.len(),
            ..CacheStats::default()
        };
        for item in &self.items {
            match item.kind() {
                ItemKind::Bookmark => {}
                ItemKind::Image => stats.images += 1,
                ItemKind::Text => stats.texts += 1,
            }
            if item.is_favorite() {
                stats.favorites += 1;
            }
        }
        stats
    }

    // --- Items ---

    pub fn add_item<S: DataStore>(&mut self, store: &mut S, item: CollectionItem) -> Result<()> {
        store.save_item(&item)?;

        let (id, kind) = (item.id(), item.kind());
        if let CollectionItem::Bookmark(b) = &item {
            self.bookmarks.push(b.clone());
        }
        self.items.push(item);

        self.emit(CacheEvent::ItemAdded { id, kind });
        Ok(())
    }

    pub fn update_item<S: DataStore>(&mut self, store: &mut S, item: CollectionItem) -> Result<()> {
        store.update_item(&item)?;

        let (id, kind) = (item.id(), item.kind());
        let bookmark = item.as_bookmark().cloned();
        match self.items.iter_mut().find(|i| i.id() == id) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }

        let in_view = self.bookmarks.iter().position(|b| b.meta.id == id);
        match (bookmark, in_view) {
            (Some(b), Some(pos)) => self.bookmarks[pos] = b,
            (None, Some(pos)) => {
                self.bookmarks.remove(pos);
            }
            // Became a bookmark: rederive to keep item order
            (Some(_), None) => self.rebuild_bookmarks(),
            (None, None) => {}
        }

        self.emit(CacheEvent::ItemUpdated { id, kind });
        Ok(())
    }

    /// Removes the item and returns what was removed, when it was cached.
    pub fn delete_item<S: DataStore>(
        &mut self,
        store: &mut S,
        id: &Uuid,
    ) -> Result<Option<CollectionItem>> {
        store.delete_item(id)?;

        let removed = self
            .items
            .iter()
            .position(|i| &i.id() == id)
            .map(|pos| self.items.remove(pos));
        self.bookmarks.retain(|b| &b.meta.id != id);

        if let Some(item) = &removed {
            self.emit(CacheEvent::ItemRemoved {
                id: *id,
                kind: item.kind(),
            });
        }
        Ok(removed)
    }

    // --- Categories ---

    pub fn add_category<S: DataStore>(&mut self, store: &mut S, category: Category) -> Result<()> {
        store.save_category(&category)?;
        self.categories.push(category);
        self.emit(CacheEvent::CategoriesChanged);
        Ok(())
    }

    pub fn update_category<S: DataStore>(
        &mut self,
        store: &mut S,
        category: Category,
    ) -> Result<()> {
        store.update_category(&category)?;
        if let Some(slot) = self.categories.iter_mut().find(|c| c.id == category.id) {
            *slot = category;
        }
        self.emit(CacheEvent::CategoriesChanged);
        Ok(())
    }

    pub fn delete_category<S: DataStore>(&mut self, store: &mut S, id: &Uuid) -> Result<()> {
        store.delete_category(id)?;
        self.categories.retain(|c| &c.id != id);
        self.emit(CacheEvent::CategoriesChanged);
        Ok(())
    }

    pub fn reorder_categories<S: DataStore>(
        &mut self,
        store: &mut S,
        categories: Vec<Category>,
    ) -> Result<()> {
        store.reorder_categories(&categories)?;
        self.categories = categories;
        self.emit(CacheEvent::CategoriesChanged);
        Ok(())
    }

    // --- Tags ---

    pub fn add_tag<S: DataStore>(&mut self, store: &mut S, tag: Tag) -> Result<()> {
        store.save_tag(&tag)?;
        self.tags.push(tag);
        self.emit(CacheEvent::TagsChanged);
        Ok(())
    }

    pub fn update_tag<S: DataStore>(&mut self, store: &mut S, tag: Tag) -> Result<()> {
        store.update_tag(&tag)?;
        if let Some(slot) = self.tags.iter_mut().find(|t| t.id == tag.id) {
            *slot = tag;
        }
        self.emit(CacheEvent::TagsChanged);
        Ok(())
    }

    pub fn delete_tag<S: DataStore>(&mut self, store: &mut S, id: &Uuid) -> Result<()> {
        store.delete_tag(id)?;
        self.tags.retain(|t| &t.id != id);
        self.emit(CacheEvent::TagsChanged);
        Ok(())
    }

    pub fn reorder_tags<S: DataStore>(&mut self, store: &mut S, tags: Vec<Tag>) -> Result<()> {
        store.reorder_tags(&tags)?;
        self.tags = tags;
        self.emit(CacheEvent::TagsChanged);
        Ok(())
    }
}

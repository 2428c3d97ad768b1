use super::backend::{Preferences, StorageBackend};
use super::DataStore;
use crate::error::{Entity, Result, SeahorseError};
use crate::model::CollectionItem;
use crate::taxonomy::{default_categories, names_match, Category, Tag};
use std::fmt::Display;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// The default [`DataStore`]: in-memory collections mirrored to a backend.
///
/// Every mutation builds the next version of its collection, hands it to the
/// backend, and only then replaces the in-memory copy.
pub struct CollectionStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    items: Vec<CollectionItem>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    preferences: Preferences,
}

impl<B: StorageBackend> CollectionStore<B> {
    /// Loads all collections, seeding the default categories on first use.
    pub fn open(backend: B) -> Self {
        Self::open_with(backend, true)
    }

    /// Loads all collections. Unreadable collections start empty and the
    /// failure is logged; categories then fall back to the defaults.
    pub fn open_with(backend: B, seed_default_categories: bool) -> Self {
        let location = backend.describe();
        debug!(location = %location, "Opening collection store");

        let items = lenient("items", &location, backend.load_items()).unwrap_or_default();
        let tags = lenient("tags", &location, backend.load_tags()).unwrap_or_default();
        let preferences =
            lenient("preferences", &location, backend.load_preferences()).unwrap_or_default();

        let categories = match backend.load_categories() {
            Ok(Some(categories)) => categories,
            Ok(None) if seed_default_categories => {
                let defaults = default_categories();
                match backend.save_categories(&defaults) {
                    Ok(()) => info!(location = %location, "Seeded default categories"),
                    Err(e) => warn!(error = %e, "Could not persist default categories"),
                }
                defaults
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(error = %e, location = %location, "Failed to load categories, using defaults");
                if seed_default_categories {
                    default_categories()
                } else {
                    Vec::new()
                }
            }
        };

        debug!(
            items = items.len(),
            categories = categories.len(),
            tags = tags.len(),
            "Collection store loaded"
        );

        Self {
            backend,
            items,
            categories,
            tags,
            preferences,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn commit_items(&mut self, next: Vec<CollectionItem>) -> Result<()> {
        self.backend.save_items(&next)?;
        self.items = next;
        Ok(())
    }

    fn commit_categories(&mut self, next: Vec<Category>) -> Result<()> {
        self.backend.save_categories(&next)?;
        self.categories = next;
        Ok(())
    }

    fn commit_tags(&mut self, next: Vec<Tag>) -> Result<()> {
        self.backend.save_tags(&next)?;
        self.tags = next;
        Ok(())
    }

    fn commit_preferences(&mut self, next: Preferences) -> Result<()> {
        self.backend.save_preferences(&next)?;
        self.preferences = next;
        Ok(())
    }

    fn category_name_clash(&self, name: &str, excluding: Option<&Uuid>) -> bool {
        self.categories
            .iter()
            .any(|c| Some(&c.id) != excluding && names_match(&c.name, name))
    }

    fn tag_name_clash(&self, name: &str, excluding: Option<&Uuid>) -> bool {
        self.tags
            .iter()
            .any(|t| Some(&t.id) != excluding && names_match(&t.name, name))
    }
}

fn lenient<T, E: Display>(
    collection: &str,
    location: &str,
    loaded: std::result::Result<Option<T>, E>,
) -> Option<T> {
    match loaded {
        Ok(value) => value,
        Err(e) => {
            error!(collection, location, error = %e, "Failed to load collection, starting empty");
            None
        }
    }
}

impl<B: StorageBackend> DataStore for CollectionStore<B> {
    fn fetch_all_items(&self) -> Result<Vec<CollectionItem>> {
        Ok(self.items.clone())
    }

    fn fetch_all_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }

    fn fetch_all_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    fn save_item(&mut self, item: &CollectionItem) -> Result<()> {
        let id = item.id();
        if self.items.iter().any(|i| i.id() == id) {
            return Err(SeahorseError::duplicate(Entity::Item, id.to_string()));
        }
        let mut next = self.items.clone();
        next.push(item.clone());
        self.commit_items(next)
    }

    fn update_item(&mut self, item: &CollectionItem) -> Result<()> {
        let id = item.id();
        let pos = self
            .items
            .iter()
            .position(|i| i.id() == id)
            .ok_or_else(|| SeahorseError::not_found(Entity::Item, id))?;
        let mut next = self.items.clone();
        next[pos] = item.clone();
        self.commit_items(next)
    }

    fn delete_item(&mut self, id: &Uuid) -> Result<()> {
        if !self.items.iter().any(|i| &i.id() == id) {
            return Err(SeahorseError::not_found(Entity::Item, id));
        }
        let next = self
            .items
            .iter()
            .filter(|i| &i.id() != id)
            .cloned()
            .collect();
        self.commit_items(next)
    }

    fn save_category(&mut self, category: &Category) -> Result<()> {
        if self.category_name_clash(&category.name, None) {
            return Err(SeahorseError::duplicate(
                Entity::Category,
                category.name.clone(),
            ));
        }
        if self.categories.iter().any(|c| c.id == category.id) {
            return Err(SeahorseError::duplicate(
                Entity::Category,
                category.id.to_string(),
            ));
        }
        let mut next = self.categories.clone();
        next.push(category.clone());
        self.commit_categories(next)
    }

    fn update_category(&mut self, category: &Category) -> Result<()> {
        let pos = self
            .categories
            .iter()
            .position(|c| c.id == category.id)
            .ok_or_else(|| SeahorseError::not_found(Entity::Category, category.id))?;
        if self.category_name_clash(&category.name, Some(&category.id)) {
            return Err(SeahorseError::duplicate(
                Entity::Category,
                category.name.clone(),
            ));
        }
        let mut next = self.categories.clone();
        next[pos] = category.clone();
        self.commit_categories(next)
    }

    fn delete_category(&mut self, id: &Uuid) -> Result<()> {
        if !self.categories.iter().any(|c| &c.id == id) {
            return Err(SeahorseError::not_found(Entity::Category, id));
        }
        let next = self
            .categories
            .iter()
            .filter(|c| &c.id != id)
            .cloned()
            .collect();
        self.commit_categories(next)
    }

    fn save_tag(&mut self, tag: &Tag) -> Result<()> {
        if self.tag_name_clash(&tag.name, None) {
            return Err(SeahorseError::duplicate(Entity::Tag, tag.name.clone()));
        }
        if self.tags.iter().any(|t| t.id == tag.id) {
            return Err(SeahorseError::duplicate(Entity::Tag, tag.id.to_string()));
        }
        let mut next = self.tags.clone();
        next.push(tag.clone());
        self.commit_tags(next)
    }

    fn update_tag(&mut self, tag: &Tag) -> Result<()> {
        let pos = self
            .tags
            .iter()
            .position(|t| t.id == tag.id)
            .ok_or_else(|| SeahorseError::not_found(Entity::Tag, tag.id))?;
        if self.tag_name_clash(&tag.name, Some(&tag.id)) {
            return Err(SeahorseError::duplicate(Entity::Tag, tag.name.clone()));
        }
        let mut next = self.tags.clone();
        next[pos] = tag.clone();
        self.commit_tags(next)
    }

    fn delete_tag(&mut self, id: &Uuid) -> Result<()> {
        if !self.tags.iter().any(|t| &t.id == id) {
            return Err(SeahorseError::not_found(Entity::Tag, id));
        }
        let next = self.tags.iter().filter(|t| &t.id != id).cloned().collect();
        self.commit_tags(next)
    }

    fn reorder_categories(&mut self, categories: &[Category]) -> Result<()> {
        self.commit_categories(categories.to_vec())
    }

    fn reorder_tags(&mut self, tags: &[Tag]) -> Result<()> {
        self.commit_tags(tags.to_vec())
    }

    fn category_exists(&self, name: &str) -> bool {
        self.category_name_clash(name, None)
    }

    fn tag_exists(&self, name: &str) -> bool {
        self.tag_name_clash(name, None)
    }

    fn preference(&self, key: &str) -> Result<Option<String>> {
        Ok(self.preferences.get(key).cloned())
    }

    fn set_preference(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.preferences.clone();
        next.insert(key.to_string(), value.to_string());
        self.commit_preferences(next)
    }

    fn delete_preference(&mut self, key: &str) -> Result<()> {
        if !self.preferences.contains_key(key) {
            return Ok(());
        }
        let mut next = self.preferences.clone();
        next.remove(key);
        self.commit_preferences(next)
    }

    fn fetch_all_preferences(&self) -> Result<Preferences> {
        Ok(self.preferences.clone())
    }

    fn force_save_all(&mut self) -> Result<()> {
        self.backend.save_items(&self.items)?;
        self.backend.save_categories(&self.categories)?;
        self.backend.save_tags(&self.tags)?;
        self.backend.save_preferences(&self.preferences)?;
        info!(location = %self.backend.describe(), "Flushed all collections");
        Ok(())
    }
}

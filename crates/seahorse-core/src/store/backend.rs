use crate::error::Result;
use crate::model::CollectionItem;
use crate::taxonomy::{Category, Tag};
use std::collections::BTreeMap;

/// Key/value preferences, ordered by key.
pub type Preferences = BTreeMap<String, String>;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`super::CollectionStore`] handles the "what" (uniqueness, lookups, ordering).
///
/// Every save replaces the whole collection. Loads return `Ok(None)` when the
/// collection has never been written, so callers can tell "empty" from "new".
pub trait StorageBackend {
    fn load_items(&self) -> Result<Option<Vec<CollectionItem>>>;

    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save_items(&self, items: &[CollectionItem]) -> Result<()>;

    fn load_categories(&self) -> Result<Option<Vec<Category>>>;

    fn save_categories(&self, categories: &[Category]) -> Result<()>;

    fn load_tags(&self) -> Result<Option<Vec<Tag>>>;

    fn save_tags(&self, tags: &[Tag]) -> Result<()>;

    fn load_preferences(&self) -> Result<Option<Preferences>>;

    fn save_preferences(&self, preferences: &Preferences) -> Result<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

use super::backend::{Preferences, StorageBackend};
use crate::error::{Result, SeahorseError};
use crate::model::CollectionItem;
use crate::taxonomy::{Category, Tag};
use std::cell::{Cell, RefCell};

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the store is single-writer.
/// This keeps `StorageBackend` on `&self` without a lock.
#[derive(Default)]
pub struct MemBackend {
    items: RefCell<Option<Vec<CollectionItem>>>,
    categories: RefCell<Option<Vec<Category>>>,
    tags: RefCell<Option<Vec<Tag>>>,
    preferences: RefCell<Option<Preferences>>,
    simulate_write_error: Cell<bool>,
    simulate_read_error: Cell<bool>,
    writes: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Makes every load fail, as a corrupt file would.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.set(simulate);
    }

    /// Number of successful collection writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn check_read(&self) -> Result<()> {
        if self.simulate_read_error.get() {
            return Err(SeahorseError::Store("Simulated read error".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(SeahorseError::Store("Simulated write error".to_string()));
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_items(&self) -> Result<Option<Vec<CollectionItem>>> {
        self.check_read()?;
        Ok(self.items.borrow().clone())
    }

    fn save_items(&self, items: &[CollectionItem]) -> Result<()> {
        self.check_write()?;
        *self.items.borrow_mut() = Some(items.to_vec());
        Ok(())
    }

    fn load_categories(&self) -> Result<Option<Vec<Category>>> {
        self.check_read()?;
        Ok(self.categories.borrow().clone())
    }

    fn save_categories(&self, categories: &[Category]) -> Result<()> {
        self.check_write()?;
        *self.categories.borrow_mut() = Some(categories.to_vec());
        Ok(())
    }

    fn load_tags(&self) -> Result<Option<Vec<Tag>>> {
        self.check_read()?;
        Ok(self.tags.borrow().clone())
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.check_write()?;
        *self.tags.borrow_mut() = Some(tags.to_vec());
        Ok(())
    }

    fn load_preferences(&self) -> Result<Option<Preferences>> {
        self.check_read()?;
        Ok(self.preferences.borrow().clone())
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.check_write()?;
        *self.preferences.borrow_mut() = Some(preferences.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

use super::ItemOrchestrator;
use crate::error::{Entity, Result, SeahorseError};
use crate::model::{Bookmark, CollectionItem};
use crate::store::DataStore;
use crate::taxonomy::{Category, PseudoCategory, Tag};
use crate::url::normalize_bookmark_url;
use uuid::Uuid;

impl<S: DataStore> ItemOrchestrator<S> {
    pub fn add_bookmark(&mut self, bookmark: Bookmark) -> Result<Bookmark> {
        let item = self.add_item(bookmark.into())?;
        expect_bookmark(item)
    }

    pub fn update_bookmark(&mut self, bookmark: Bookmark) -> Result<Bookmark> {
        let item = self.update_item(bookmark.into())?;
        expect_bookmark(item)
    }

    /// Deletes a bookmark. Ids of other item kinds are `NotFound`.
    pub fn delete_bookmark(&mut self, id: &Uuid) -> Result<()> {
        if self.cache.bookmark(id).is_none() {
            return Err(SeahorseError::not_found(Entity::Item, id));
        }
        self.delete_item(id)
    }

    /// Bookmarks shown under `category`.
    ///
    /// "All Bookmarks" is answered from the cache. "Favorites" and real
    /// categories are answered by the store.
    pub fn fetch_bookmarks_for_category(&self, category: &Category) -> Result<Vec<Bookmark>> {
        match category.pseudo() {
            Some(PseudoCategory::AllBookmarks) => Ok(self.cache.bookmarks().to_vec()),
            Some(PseudoCategory::Favorites) => self.store.fetch_favorite_bookmarks(),
            None => self.store.fetch_bookmarks_by_category(&category.id),
        }
    }

    pub fn fetch_bookmarks_for_tag(&self, tag: &Tag) -> Result<Vec<Bookmark>> {
        self.store.fetch_bookmarks_by_tag(&tag.id)
    }

    /// Flips the tag on the bookmark. Returns true if the bookmark is now tagged.
    pub fn toggle_tag_on_bookmark(&mut self, bookmark_id: &Uuid, tag_id: &Uuid) -> Result<bool> {
        let mut bookmark = self.cached_bookmark(bookmark_id)?;
        let tagged = bookmark.meta.toggle_tag(*tag_id);
        self.update_bookmark(bookmark)?;
        Ok(tagged)
    }

    pub fn add_tag_to_bookmark(&mut self, bookmark_id: &Uuid, tag_id: &Uuid) -> Result<Bookmark> {
        let mut bookmark = self.cached_bookmark(bookmark_id)?;
        if !bookmark.meta.add_tag(*tag_id) {
            return Ok(bookmark);
        }
        self.update_bookmark(bookmark)
    }

    pub fn remove_tag_from_bookmark(
        &mut self,
        bookmark_id: &Uuid,
        tag_id: &Uuid,
    ) -> Result<Bookmark> {
        let mut bookmark = self.cached_bookmark(bookmark_id)?;
        if !bookmark.meta.remove_tag(tag_id) {
            return Ok(bookmark);
        }
        self.update_bookmark(bookmark)
    }

    /// First cached bookmark whose URL normalizes to the same key as `url`.
    pub fn find_bookmark_by_url(&self, url: &str) -> Option<&Bookmark> {
        let key = normalize_bookmark_url(url);
        if key.is_empty() {
            return None;
        }
        self.cache
            .bookmarks()
            .iter()
            .find(|b| normalize_bookmark_url(&b.url) == key)
    }

    /// Tags attached to an item, resolved through the cache.
    pub fn tags_for_item(&self, id: &Uuid) -> Result<Vec<Tag>> {
        let item = self
            .cache
            .item(id)
            .ok_or_else(|| SeahorseError::not_found(Entity::Item, id))?;
        Ok(self.cache.tags_for(item).into_iter().cloned().collect())
    }

    fn cached_bookmark(&self, id: &Uuid) -> Result<Bookmark> {
        self.cache
            .bookmark(id)
            .cloned()
            .ok_or_else(|| SeahorseError::not_found(Entity::Item, id))
    }
}

fn expect_bookmark(item: CollectionItem) -> Result<Bookmark> {
    match item {
        CollectionItem::Bookmark(b) => Ok(b),
        other => Err(SeahorseError::Store(format!(
            "expected a bookmark, got {}",
            other.kind()
        ))),
    }
}

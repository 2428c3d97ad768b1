use super::ItemOrchestrator;
use crate::error::{Entity, Result, SeahorseError};
use crate::model::{CollectionItem, ImageItem};
use crate::paths::AssetLocation;
use crate::store::DataStore;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

impl<S: DataStore> ItemOrchestrator<S> {
    /// Stores a new item. Returns the record as written.
    pub fn add_item(&mut self, item: CollectionItem) -> Result<CollectionItem> {
        let item = self.prepare(item, None)?;
        self.cache.add_item(&mut self.store, item.clone())?;
        info!(id = %item.id(), kind = %item.kind(), "Item added");
        Ok(item)
    }

    /// Replaces the item with the same id and stamps its modified date.
    pub fn update_item(&mut self, item: CollectionItem) -> Result<CollectionItem> {
        let previous = self
            .cache
            .item(&item.id())
            .cloned()
            .ok_or_else(|| SeahorseError::not_found(Entity::Item, item.id()))?;
        let mut item = self.prepare(item, Some(&previous))?;
        item.meta_mut().touch();
        self.cache.update_item(&mut self.store, item.clone())?;
        debug!(id = %item.id(), "Item updated");
        Ok(item)
    }

    /// Deletes the item. For images stored under the managed assets
    /// directory, the image and thumbnail files are removed afterwards.
    pub fn delete_item(&mut self, id: &Uuid) -> Result<()> {
        if self.cache.item(id).is_none() {
            return Err(SeahorseError::not_found(Entity::Item, id));
        }
        let removed = self.cache.delete_item(&mut self.store, id)?;
        info!(id = %id, "Item deleted");

        if let Some(CollectionItem::Image(image)) = removed {
            self.remove_image_files(&image);
        }
        Ok(())
    }

    /// Copies `source` into the managed assets directory and stores `image`
    /// pointing at the copy. The copy is removed again if the item cannot be
    /// stored.
    pub fn add_image_file(
        &mut self,
        source: &Path,
        mut image: ImageItem,
    ) -> Result<CollectionItem> {
        let name = self.layout.import_asset(source)?;
        let copied = self.layout.assets_dir().join(&name);
        image.image_path = name;
        match self.add_item(image.into()) {
            Ok(item) => Ok(item),
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&copied) {
                    warn!(
                        path = %copied.display(),
                        error = %cleanup,
                        "Failed to remove image copy"
                    );
                }
                Err(e)
            }
        }
    }

    pub fn set_favorite(&mut self, id: &Uuid, favorite: bool) -> Result<CollectionItem> {
        let mut item = self
            .cache
            .item(id)
            .cloned()
            .ok_or_else(|| SeahorseError::not_found(Entity::Item, id))?;
        item.meta_mut().is_favorite = favorite;
        self.update_item(item)
    }

    /// Normalizes image paths and checks newly referenced categories and tags.
    ///
    /// References already present on `previous` are not re-checked, so an
    /// item whose category was deleted can still be edited.
    fn prepare(
        &self,
        mut item: CollectionItem,
        previous: Option<&CollectionItem>,
    ) -> Result<CollectionItem> {
        if let CollectionItem::Image(image) = &mut item {
            image.image_path = self.layout.relative_asset_name(&image.image_path);
            if let Some(thumb) = &image.thumbnail_path {
                image.thumbnail_path = Some(self.layout.relative_asset_name(thumb));
            }
        }

        let meta = item.meta();
        let prev_meta = previous.map(|p| p.meta());

        if let Some(category_id) = &meta.category_id {
            let unchanged = prev_meta.is_some_and(|p| p.category_id.as_ref() == Some(category_id));
            if !unchanged && self.cache.category(category_id).is_none() {
                return Err(SeahorseError::not_found(Entity::Category, category_id));
            }
        }

        for tag_id in &meta.tag_ids {
            let unchanged = prev_meta.is_some_and(|p| p.has_tag(tag_id));
            if !unchanged && self.cache.tag(tag_id).is_none() {
                return Err(SeahorseError::not_found(Entity::Tag, tag_id));
            }
        }

        Ok(item)
    }

    fn remove_image_files(&self, image: &ImageItem) {
        let paths = std::iter::once(&image.image_path).chain(image.thumbnail_path.as_ref());
        for stored in paths {
            let path = match self.layout.stored_asset_path(stored) {
                AssetLocation::Remote(_) => continue,
                AssetLocation::Local(path) => path,
            };
            if !self.layout.is_managed_asset(&path) {
                debug!(path = %path.display(), "Image is outside the assets directory, leaving it");
                continue;
            }
            if !path.exists() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed image file"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove image file"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::model::{Bookmark, CollectionItem, ImageItem, TextItem};
    use crate::store::DataStore;
    use crate::taxonomy::Tag;
    use crate::test_utils::orchestrator;
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn test_add_then_delete_bookmark_scenario() {
        let (_dir, mut orch) = orchestrator();
        let item = orch
            .add_item(Bookmark::new("A", "https://a.com").into())
            .unwrap();
        assert_eq!(orch.cache().items().len(), 1);
        assert_eq!(orch.cache().bookmarks().len(), 1);

        orch.delete_item(&item.id()).unwrap();
        assert_eq!(orch.cache().items().len(), 0);
        assert_eq!(orch.cache().bookmarks().len(), 0);
    }

    #[test]
    fn test_cache_equals_fresh_store_fetch() {
        let (_dir, mut orch) = orchestrator();
        let text = orch.add_item(TextItem::new("one").into()).unwrap();
        orch.add_item(Bookmark::new("B", "https://b.com").into())
            .unwrap();
        orch.set_favorite(&text.id(), true).unwrap();

        let stored = orch.store().fetch_all_items().unwrap();
        assert_eq!(orch.cache().items(), stored.as_slice());
    }

    #[test]
    fn test_update_unknown_item_is_not_found() {
        let (_dir, mut orch) = orchestrator();
        let err = orch.update_item(TextItem::new("ghost").into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = orch.delete_item(&Uuid::new_v4()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_update_stamps_modified_date() {
        let (_dir, mut orch) = orchestrator();
        let item = orch.add_item(TextItem::new("draft").into()).unwrap();
        assert!(item.meta().modified_date.is_none());
        let updated = orch.update_item(item).unwrap();
        assert!(updated.meta().modified_date.is_some());
    }

    #[test]
    fn test_unknown_references_are_rejected() {
        let (_dir, mut orch) = orchestrator();
        let err = orch
            .add_item(TextItem::new("x").in_category(Uuid::new_v4()).into())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let mut text = TextItem::new("y");
        text.meta.add_tag(Uuid::new_v4());
        assert_eq!(
            orch.add_item(text.into()).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(orch.cache().items().is_empty());
    }

    #[test]
    fn test_dangling_references_do_not_block_edits() {
        let (_dir, mut orch) = orchestrator();
        let tag = orch.add_tag(Tag::new("temp")).unwrap();
        let mut text = TextItem::new("tagged");
        text.meta.add_tag(tag.id);
        let item = orch.add_item(text.into()).unwrap();

        orch.delete_tag(&tag.id).unwrap();
        let mut edited = orch.cache().item(&item.id()).unwrap().clone();
        edited.meta_mut().notes = Some("still editable".into());
        orch.update_item(edited).unwrap();
        assert!(orch.cache().item(&item.id()).unwrap().meta().has_tag(&tag.id));
    }

    #[test]
    fn test_image_paths_are_stored_relative() {
        let (_dir, mut orch) = orchestrator();
        let absolute = orch.layout().assets_dir().join("cat.png");
        let mut image = ImageItem::new(absolute.to_str().unwrap());
        image.thumbnail_path = Some(
            orch.layout()
                .assets_dir()
                .join("cat-thumb.png")
                .to_string_lossy()
                .to_string(),
        );
        let item = orch.add_item(image.into()).unwrap();

        let items = orch.store().fetch_all_items().unwrap();
        let CollectionItem::Image(stored) = &items[0] else {
            panic!("expected an image");
        };
        assert_eq!(stored.image_path, "cat.png");
        assert_eq!(stored.thumbnail_path.as_deref(), Some("cat-thumb.png"));
        assert_eq!(orch.cache().item(&item.id()).unwrap(), &item);
    }

    #[test]
    fn test_delete_image_removes_managed_files() {
        let (_dir, mut orch) = orchestrator();
        let assets = orch.layout().assets_dir();
        fs::write(assets.join("cat.png"), b"png").unwrap();
        fs::write(assets.join("cat-thumb.png"), b"png").unwrap();

        let mut image = ImageItem::new("cat.png");
        image.thumbnail_path = Some("cat-thumb.png".into());
        let item = orch.add_item(image.into()).unwrap();
        orch.delete_item(&item.id()).unwrap();

        assert!(!assets.join("cat.png").exists());
        assert!(!assets.join("cat-thumb.png").exists());
    }

    #[test]
    fn test_delete_image_leaves_outside_files_alone() {
        let (dir, mut orch) = orchestrator();
        let outside = dir.path().join("keep.png");
        fs::write(&outside, b"png").unwrap();
        let escape = dir.path().join("Data").join("secret.png");
        fs::write(&escape, b"png").unwrap();

        let a = orch
            .add_item(ImageItem::new(outside.to_str().unwrap()).into())
            .unwrap();
        let b = orch
            .add_item(ImageItem::new("../Data/secret.png").into())
            .unwrap();
        orch.delete_item(&a.id()).unwrap();
        orch.delete_item(&b.id()).unwrap();

        assert!(outside.exists());
        assert!(escape.exists());
    }

    #[test]
    fn test_delete_image_with_missing_file_is_ok() {
        let (_dir, mut orch) = orchestrator();
        let item = orch
            .add_item(ImageItem::new("never-written.png").into())
            .unwrap();
        orch.delete_item(&item.id()).unwrap();
        assert!(orch.cache().items().is_empty());
    }

    #[test]
    fn test_add_image_file_copies_into_library() {
        let (dir, mut orch) = orchestrator();
        let source = dir.path().join("holiday.png");
        fs::write(&source, b"png").unwrap();

        let item = orch.add_image_file(&source, ImageItem::new("")).unwrap();
        let CollectionItem::Image(image) = &item else {
            panic!("expected an image");
        };
        assert!(!image.image_path.contains('/'));
        let copy = orch.layout().assets_dir().join(&image.image_path);
        assert!(copy.exists());

        orch.delete_item(&item.id()).unwrap();
        assert!(!copy.exists());
        assert!(source.exists());
    }

    #[test]
    fn test_add_image_file_failure_leaves_no_copy() {
        let (dir, mut orch) = orchestrator();
        let source = dir.path().join("holiday.png");
        fs::write(&source, b"png").unwrap();

        orch.store().backend().set_simulate_write_error(true);
        assert!(orch.add_image_file(&source, ImageItem::new("")).is_err());
        let copies = fs::read_dir(orch.layout().assets_dir()).unwrap().count();
        assert_eq!(copies, 0);
        assert!(orch.cache().items().is_empty());
    }

    #[test]
    fn test_failed_delete_keeps_item_and_file() {
        let (_dir, mut orch) = orchestrator();
        let assets = orch.layout().assets_dir();
        fs::write(assets.join("dog.png"), b"png").unwrap();
        let item = orch.add_item(ImageItem::new("dog.png").into()).unwrap();

        orch.store().backend().set_simulate_write_error(true);
        assert!(orch.delete_item(&item.id()).is_err());
        assert!(orch.cache().item(&item.id()).is_some());
        assert!(assets.join("dog.png").exists());
    }
}

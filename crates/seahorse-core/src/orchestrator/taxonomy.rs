use super::ItemOrchestrator;
use crate::error::{Entity, Result, SeahorseError};
use crate::store::DataStore;
use crate::taxonomy::{validate_color, validate_name, Category, Tag};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

fn checked_name(name: &str) -> Result<String> {
    validate_name(name).map_err(|e| SeahorseError::InvalidName(e.to_string()))?;
    Ok(name.trim().to_string())
}

fn checked_color(color: &str) -> Result<()> {
    validate_color(color).map_err(|e| SeahorseError::InvalidInput(e.to_string()))
}

/// Rebuilds `current` in the order given by `ids`, which must name every
/// entry exactly once.
fn permute<T: Clone>(
    current: &[T],
    ids: &[Uuid],
    entity: Entity,
    id_of: impl Fn(&T) -> Uuid,
) -> Result<Vec<T>> {
    let unique: HashSet<&Uuid> = ids.iter().collect();
    if ids.len() != current.len() || unique.len() != ids.len() {
        return Err(SeahorseError::InvalidInput(format!(
            "new order must list each {} exactly once",
            entity
        )));
    }
    ids.iter()
        .map(|id| {
            current
                .iter()
                .find(|entry| &id_of(entry) == id)
                .cloned()
                .ok_or_else(|| SeahorseError::not_found(entity, id))
        })
        .collect()
}

impl<S: DataStore> ItemOrchestrator<S> {
    /// A category with the configured default color.
    pub fn new_category(&self, name: &str) -> Category {
        Category::new(name.trim()).with_color(self.defaults.category_color.clone())
    }

    /// A tag with the configured default color.
    pub fn new_tag(&self, name: &str) -> Tag {
        Tag::new(name.trim()).with_color(self.defaults.tag_color.clone())
    }

    // --- Categories ---

    pub fn add_category(&mut self, mut category: Category) -> Result<Category> {
        category.name = checked_name(&category.name)?;
        checked_color(&category.color_hex)?;
        if self.cache.category_name_taken(&category.name, None) {
            return Err(SeahorseError::duplicate(Entity::Category, category.name));
        }
        self.cache.add_category(&mut self.store, category.clone())?;
        info!(name = %category.name, "Category added");
        Ok(category)
    }

    pub fn update_category(&mut self, mut category: Category) -> Result<Category> {
        if self.cache.category(&category.id).is_none() {
            return Err(SeahorseError::not_found(Entity::Category, category.id));
        }
        category.name = checked_name(&category.name)?;
        checked_color(&category.color_hex)?;
        if self
            .cache
            .category_name_taken(&category.name, Some(&category.id))
        {
            return Err(SeahorseError::duplicate(Entity::Category, category.name));
        }
        self.cache.update_category(&mut self.store, category.clone())?;
        Ok(category)
    }

    pub fn rename_category(&mut self, id: &Uuid, name: &str) -> Result<Category> {
        let mut category = self
            .cache
            .category(id)
            .cloned()
            .ok_or_else(|| SeahorseError::not_found(Entity::Category, id))?;
        category.name = name.to_string();
        self.update_category(category)
    }

    /// Removes the category. Items keep their (now dangling) category id.
    pub fn delete_category(&mut self, id: &Uuid) -> Result<()> {
        if self.cache.category(id).is_none() {
            return Err(SeahorseError::not_found(Entity::Category, id));
        }
        self.cache.delete_category(&mut self.store, id)?;
        info!(id = %id, "Category deleted");
        Ok(())
    }

    pub fn reorder_categories(&mut self, ids: &[Uuid]) -> Result<()> {
        let next = permute(self.cache.categories(), ids, Entity::Category, |c| c.id)?;
        self.cache.reorder_categories(&mut self.store, next)
    }

    // --- Tags ---

    pub fn add_tag(&mut self, mut tag: Tag) -> Result<Tag> {
        tag.name = checked_name(&tag.name)?;
        checked_color(&tag.color_hex)?;
        if self.cache.tag_name_taken(&tag.name, None) {
            return Err(SeahorseError::duplicate(Entity::Tag, tag.name));
        }
        self.cache.add_tag(&mut self.store, tag.clone())?;
        info!(name = %tag.name, "Tag added");
        Ok(tag)
    }

    pub fn update_tag(&mut self, mut tag: Tag) -> Result<Tag> {
        if self.cache.tag(&tag.id).is_none() {
            return Err(SeahorseError::not_found(Entity::Tag, tag.id));
        }
        tag.name = checked_name(&tag.name)?;
        checked_color(&tag.color_hex)?;
        if self.cache.tag_name_taken(&tag.name, Some(&tag.id)) {
            return Err(SeahorseError::duplicate(Entity::Tag, tag.name));
        }
        self.cache.update_tag(&mut self.store, tag.clone())?;
        Ok(tag)
    }

    pub fn rename_tag(&mut self, id: &Uuid, name: &str) -> Result<Tag> {
        let mut tag = self
            .cache
            .tag(id)
            .cloned()
            .ok_or_else(|| SeahorseError::not_found(Entity::Tag, id))?;
        tag.name = name.to_string();
        self.update_tag(tag)
    }

    /// Removes the tag. Items keep the id in their tag list.
    pub fn delete_tag(&mut self, id: &Uuid) -> Result<()> {
        if self.cache.tag(id).is_none() {
            return Err(SeahorseError::not_found(Entity::Tag, id));
        }
        self.cache.delete_tag(&mut self.store, id)?;
        info!(id = %id, "Tag deleted");
        Ok(())
    }

    pub fn reorder_tags(&mut self, ids: &[Uuid]) -> Result<()> {
        let next = permute(self.cache.tags(), ids, Entity::Tag, |t| t.id)?;
        self.cache.reorder_tags(&mut self.store, next)
    }
}

#[cfg(test)]
mod tests {
    use super::super::TaxonomyDefaults;
    use crate::error::ErrorKind;
    use crate::model::TextItem;
    use crate::store::DataStore;
    use crate::taxonomy::{Category, Tag};
    use crate::test_utils::orchestrator;
    use uuid::Uuid;

    #[test]
    fn test_duplicate_category_name_any_case() {
        let (_dir, mut orch) = orchestrator();
        orch.add_category(Category::new("Work")).unwrap();
        let err = orch.add_category(Category::new("work")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
        assert_eq!(orch.cache().categories().len(), 4);
    }

    #[test]
    fn test_rename_category_to_own_name_succeeds() {
        let (_dir, mut orch) = orchestrator();
        let work = orch.add_category(Category::new("Work")).unwrap();
        orch.rename_category(&work.id, "Work").unwrap();
        let renamed = orch.rename_category(&work.id, "WORK").unwrap();
        assert_eq!(renamed.name, "WORK");
        assert_eq!(
            orch.rename_category(&work.id, "favorites").unwrap_err().kind(),
            ErrorKind::DuplicateEntry
        );
    }

    #[test]
    fn test_names_are_trimmed_and_validated() {
        let (_dir, mut orch) = orchestrator();
        let tag = orch.add_tag(Tag::new("  spaced  ")).unwrap();
        assert_eq!(tag.name, "spaced");

        assert_eq!(
            orch.add_tag(Tag::new("   ")).unwrap_err().kind(),
            ErrorKind::Invalid
        );
        assert_eq!(
            orch.add_category(Category::new("x".repeat(65)))
                .unwrap_err()
                .kind(),
            ErrorKind::Invalid
        );
        assert_eq!(
            orch.add_tag(Tag::new("ok").with_color("blue"))
                .unwrap_err()
                .kind(),
            ErrorKind::Invalid
        );
    }

    #[test]
    fn test_delete_category_does_not_cascade() {
        let (_dir, mut orch) = orchestrator();
        let work = orch.add_category(Category::new("Work")).unwrap();
        let item = orch
            .add_item(TextItem::new("memo").in_category(work.id).into())
            .unwrap();

        orch.delete_category(&work.id).unwrap();
        assert!(orch.cache().category(&work.id).is_none());
        assert_eq!(
            orch.cache().item(&item.id()).unwrap().category_id(),
            Some(work.id)
        );
        assert_eq!(
            orch.delete_category(&work.id).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_tag_rename_and_delete() {
        let (_dir, mut orch) = orchestrator();
        let a = orch.add_tag(Tag::new("a")).unwrap();
        orch.add_tag(Tag::new("b")).unwrap();
        assert_eq!(
            orch.rename_tag(&a.id, "B").unwrap_err().kind(),
            ErrorKind::DuplicateEntry
        );
        orch.rename_tag(&a.id, "c").unwrap();
        assert_eq!(orch.store().fetch_all_tags().unwrap()[0].name, "c");

        orch.delete_tag(&a.id).unwrap();
        assert_eq!(orch.cache().tags().len(), 1);
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let (_dir, mut orch) = orchestrator();
        let mut ids: Vec<Uuid> = orch.cache().categories().iter().map(|c| c.id).collect();
        ids.reverse();
        orch.reorder_categories(&ids).unwrap();
        assert_eq!(orch.cache().categories()[0].name, "None");
        assert_eq!(
            orch.store().fetch_all_categories().unwrap()[0].name,
            "None"
        );

        assert_eq!(
            orch.reorder_categories(&ids[..2]).unwrap_err().kind(),
            ErrorKind::Invalid
        );
        let repeated = vec![ids[0], ids[0], ids[1]];
        assert_eq!(
            orch.reorder_categories(&repeated).unwrap_err().kind(),
            ErrorKind::Invalid
        );
        let unknown = vec![ids[0], ids[1], Uuid::new_v4()];
        assert_eq!(
            orch.reorder_categories(&unknown).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_configured_default_colors() {
        let (_dir, orch) = orchestrator();
        let orch = orch.with_defaults(TaxonomyDefaults {
            category_color: "#34C759".into(),
            tag_color: "#FF9500".into(),
        });
        assert_eq!(orch.new_category(" Home ").color_hex, "#34C759");
        assert_eq!(orch.new_category(" Home ").name, "Home");
        assert_eq!(orch.new_tag("x").color_hex, "#FF9500");
    }
}

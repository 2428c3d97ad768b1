//! Categories and tags.
//!
//! Both are user-managed registries that items point into by id. An item
//! belongs to at most one category and to any number of tags.
//!
//! ## Names
//!
//! Names are unique per registry, compared case-insensitively. See
//! [`validation`] for the full rules.
//!
//! ## Pseudo-Categories
//!
//! Two of the seeded default categories are views rather than containers:
//! "All Bookmarks" lists every bookmark and "Favorites" lists favorited
//! bookmarks. They are recognized by name, see [`Category::pseudo`].

pub mod validation;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use validation::{names_match, validate_color, validate_name, ValidationError};

pub const DEFAULT_COLOR: &str = "#007AFF";
pub const DEFAULT_CATEGORY_ICON: &str = "folder.fill";

pub const ALL_BOOKMARKS: &str = "All Bookmarks";
pub const FAVORITES: &str = "Favorites";
pub const UNCATEGORIZED: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoCategory {
    AllBookmarks,
    Favorites,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_category_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color_hex: String,
}

fn default_category_icon() -> String {
    DEFAULT_CATEGORY_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: default_category_icon(),
            color_hex: default_color(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_color(mut self, color_hex: impl Into<String>) -> Self {
        self.color_hex = color_hex.into();
        self
    }

    /// Returns which pseudo-category this is, if any.
    pub fn pseudo(&self) -> Option<PseudoCategory> {
        match self.name.as_str() {
            ALL_BOOKMARKS => Some(PseudoCategory::AllBookmarks),
            FAVORITES => Some(PseudoCategory::Favorites),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_color")]
    pub color_hex: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color_hex: default_color(),
        }
    }

    pub fn with_color(mut self, color_hex: impl Into<String>) -> Self {
        self.color_hex = color_hex.into();
        self
    }
}

/// Categories written on first launch, when no categories file exists yet.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(ALL_BOOKMARKS)
            .with_icon("folder.fill")
            .with_color("#007AFF"),
        Category::new(FAVORITES)
            .with_icon("star.fill")
            .with_color("#FFCC00"),
        Category::new(UNCATEGORIZED)
            .with_icon("folder.fill")
            .with_color("#8E8E93"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories() {
        let defaults = default_categories();
        let names: Vec<&str> = defaults.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["All Bookmarks", "Favorites", "None"]);
        assert_eq!(defaults[0].pseudo(), Some(PseudoCategory::AllBookmarks));
        assert_eq!(defaults[1].pseudo(), Some(PseudoCategory::Favorites));
        assert_eq!(defaults[2].pseudo(), None);
    }

    #[test]
    fn test_category_serde_defaults() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id":"{}","name":"Work"}}"#, id);
        let category: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(category.icon, DEFAULT_CATEGORY_ICON);
        assert_eq!(category.color_hex, DEFAULT_COLOR);
    }

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("rust").with_color("#FF3B30");
        assert_eq!(tag.name, "rust");
        assert_eq!(tag.color_hex, "#FF3B30");
    }
}

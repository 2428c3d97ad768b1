//! # Domain Model: Collection Items
//!
//! Seahorse stores three kinds of things a user wants to keep around: web
//! bookmarks, saved images and free-form text notes. They share a common
//! header ([`ItemMeta`]) and differ only in their payload, so they are modeled
//! as one sum type, [`CollectionItem`], with one variant per kind.
//!
//! ## Serialized Form
//!
//! Items are stored in a single `items.json` array. Each entry is tagged by
//! `kind` and carries the shared header fields inline next to the payload:
//!
//! ```text
//! {
//!   "kind": "bookmark",
//!   "id": "5b0c…",
//!   "category_id": null,
//!   "tag_ids": ["9f2e…"],
//!   "is_favorite": false,
//!   "added_date": "2026-01-08T10:15:30Z",
//!   "title": "Rust",
//!   "url": "https://www.rust-lang.org",
//!   "icon": "link.circle.fill"
//! }
//! ```
//!
//! ## Categories
//!
//! `category_id: None` means "uncategorized". A category id that no longer
//! resolves (the category was deleted) is kept as-is; deleting a category
//! never rewrites items.
//!
//! ## Tags
//!
//! `tag_ids` behaves like an ordered set: [`ItemMeta::add_tag`] never inserts a
//! duplicate and [`ItemMeta::toggle_tag`] flips membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

pub const DEFAULT_BOOKMARK_ICON: &str = "link.circle.fill";

/// Number of characters kept by [`TextItem::content_preview`].
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Bookmark,
    Image,
    Text,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Bookmark => "bookmark",
            ItemKind::Image => "image",
            ItemKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// Fields shared by every item kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub id: Uuid,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub is_favorite: bool,
    pub added_date: DateTime<Utc>,
    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Set once an external parser has enriched the item.
    #[serde(default)]
    pub is_parsed: bool,
}

impl ItemMeta {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id: None,
            tag_ids: Vec::new(),
            is_favorite: false,
            added_date: Utc::now(),
            modified_date: None,
            notes: None,
            is_parsed: false,
        }
    }

    pub fn has_tag(&self, tag_id: &Uuid) -> bool {
        self.tag_ids.contains(tag_id)
    }

    /// Adds the tag unless already present. Returns true if membership changed.
    pub fn add_tag(&mut self, tag_id: Uuid) -> bool {
        if self.has_tag(&tag_id) {
            return false;
        }
        self.tag_ids.push(tag_id);
        true
    }

    /// Removes the tag. Returns true if membership changed.
    pub fn remove_tag(&mut self, tag_id: &Uuid) -> bool {
        let before = self.tag_ids.len();
        self.tag_ids.retain(|t| t != tag_id);
        self.tag_ids.len() != before
    }

    /// Flips membership and returns the new state (true = tagged).
    pub fn toggle_tag(&mut self, tag_id: Uuid) -> bool {
        if self.remove_tag(&tag_id) {
            false
        } else {
            self.tag_ids.push(tag_id);
            true
        }
    }

    pub fn touch(&mut self) {
        self.modified_date = Some(Utc::now());
    }
}

impl Default for ItemMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Open Graph / Twitter card data scraped for a bookmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(flatten)]
    pub meta: ItemMeta,
    pub title: String,
    pub url: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub metadata: Option<WebMetadata>,
}

fn default_icon() -> String {
    DEFAULT_BOOKMARK_ICON.to_string()
}

impl Bookmark {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            meta: ItemMeta::new(),
            title: title.into(),
            url: url.into(),
            icon: default_icon(),
            metadata: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.meta.id
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.meta.category_id = Some(category_id);
        self
    }

    pub fn favorite(mut self) -> Self {
        self.meta.is_favorite = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    #[serde(flatten)]
    pub meta: ItemMeta,
    /// A filename inside the managed assets directory, an absolute path, or a
    /// remote `http(s)` URL.
    pub image_path: String,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub image_size: Option<ImageSize>,
}

impl ImageItem {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            meta: ItemMeta::new(),
            image_path: image_path.into(),
            thumbnail_path: None,
            image_size: None,
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.meta.category_id = Some(category_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    #[serde(flatten)]
    pub meta: ItemMeta,
    pub content: String,
}

impl TextItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            meta: ItemMeta::new(),
            content: content.into(),
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.meta.category_id = Some(category_id);
        self
    }

    /// First 200 characters of the body, with `...` appended when truncated.
    pub fn content_preview(&self) -> String {
        if self.content.chars().count() <= PREVIEW_CHARS {
            return self.content.clone();
        }
        let mut preview: String = self.content.chars().take(PREVIEW_CHARS).collect();
        preview.push_str("...");
        preview
    }
}

/// A stored item of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CollectionItem {
    Bookmark(Bookmark),
    Image(ImageItem),
    Text(TextItem),
}

impl CollectionItem {
    pub fn meta(&self) -> &ItemMeta {
        match self {
            CollectionItem::Bookmark(b) => &b.meta,
            CollectionItem::Image(i) => &i.meta,
            CollectionItem::Text(t) => &t.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut ItemMeta {
        match self {
            CollectionItem::Bookmark(b) => &mut b.meta,
            CollectionItem::Image(i) => &mut i.meta,
            CollectionItem::Text(t) => &mut t.meta,
        }
    }

    pub fn id(&self) -> Uuid {
        self.meta().id
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            CollectionItem::Bookmark(_) => ItemKind::Bookmark,
            CollectionItem::Image(_) => ItemKind::Image,
            CollectionItem::Text(_) => ItemKind::Text,
        }
    }

    pub fn as_bookmark(&self) -> Option<&Bookmark> {
        match self {
            CollectionItem::Bookmark(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.meta().is_favorite
    }

    pub fn category_id(&self) -> Option<Uuid> {
        self.meta().category_id
    }

    pub fn added_date(&self) -> DateTime<Utc> {
        self.meta().added_date
    }

    /// Short human label: bookmark title, image file name, or the first line of a note.
    pub fn label(&self) -> String {
        match self {
            CollectionItem::Bookmark(b) => {
                if b.title.trim().is_empty() {
                    b.url.clone()
                } else {
                    b.title.clone()
                }
            }
            CollectionItem::Image(i) => Path::new(&i.image_path)
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| i.image_path.clone()),
            CollectionItem::Text(t) => t
                .content
                .lines()
                .find(|l| !l.trim().is_empty())
                .map(|l| l.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<Bookmark> for CollectionItem {
    fn from(bookmark: Bookmark) -> Self {
        CollectionItem::Bookmark(bookmark)
    }
}

impl From<ImageItem> for CollectionItem {
    fn from(image: ImageItem) -> Self {
        CollectionItem::Image(image)
    }
}

impl From<TextItem> for CollectionItem {
    fn from(text: TextItem) -> Self {
        CollectionItem::Text(text)
    }
}

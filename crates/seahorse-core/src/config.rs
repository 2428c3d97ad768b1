//! # Configuration
//!
//! Seahorse configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files and environment variables.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `SEAHORSE__PRETTY_JSON`, `SEAHORSE__BACKUP_KEEP`, etc.
//! 2. **Root Config**: `<storage root>/seahorse.toml`, travels with the library.
//! 3. **User Config**: `seahorse.toml` in the OS config directory.
//! 4. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `pretty_json` | `true` | Indent the JSON collection files |
//! | `seed_default_categories` | `true` | Create "All Bookmarks", "Favorites" and "None" on first use |
//! | `default_tag_color` | `#007AFF` | Color for tags created without one |
//! | `default_category_color` | `#007AFF` | Color for categories created without one |
//! | `backup_keep` | `10` | Archives kept in `Backups/`; `0` keeps all |

use crate::orchestrator::TaxonomyDefaults;
use crate::taxonomy::{validate_color, DEFAULT_COLOR};
use confique::Config;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CONFIG_FILE: &str = "seahorse.toml";

/// Configuration for Seahorse, stored in `seahorse.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SeahorseConfig {
    /// Indent the JSON collection files.
    #[config(default = true)]
    pub pretty_json: bool,

    /// Create the default categories when no categories file exists.
    #[config(default = true)]
    pub seed_default_categories: bool,

    /// Color for new tags, as #RRGGBB.
    #[config(default = "#007AFF")]
    pub default_tag_color: String,

    /// Color for new categories, as #RRGGBB.
    #[config(default = "#007AFF")]
    pub default_category_color: String,

    /// Number of backup archives to keep. 0 keeps all of them.
    #[config(default = 10)]
    pub backup_keep: usize,
}

impl Default for SeahorseConfig {
    fn default() -> Self {
        Self {
            pretty_json: true,
            seed_default_categories: true,
            default_tag_color: DEFAULT_COLOR.to_string(),
            default_category_color: DEFAULT_COLOR.to_string(),
            backup_keep: 10,
        }
    }
}

impl SeahorseConfig {
    /// Default colors for new categories and tags. Invalid configured colors
    /// are logged and replaced with the built-in default.
    pub fn taxonomy_defaults(&self) -> TaxonomyDefaults {
        TaxonomyDefaults {
            category_color: checked_color("default_category_color", &self.default_category_color),
            tag_color: checked_color("default_tag_color", &self.default_tag_color),
        }
    }
}

fn checked_color(key: &str, value: &str) -> String {
    match validate_color(value) {
        Ok(()) => value.to_string(),
        Err(e) => {
            warn!(key, error = %e, "Ignoring configured color");
            DEFAULT_COLOR.to_string()
        }
    }
}

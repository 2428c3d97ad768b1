//! # Moving Data In and Out
//!
//! Two exchange formats, both routed through [`ItemOrchestrator`] so the cache
//! and its subscribers see every imported record:
//!
//! - [`folder`]: a full library copy, readable by another Seahorse install.
//!
//!   ```text
//!   Seahorse_Export_2026-01-08/
//!   ├── Data/
//!   │   ├── items.json
//!   │   ├── categories.json
//!   │   ├── tags.json
//!   │   └── preferences.json
//!   └── Images/
//!       └── 3f2a….png
//!   ```
//!
//!   Importing merges into the open library: records already present (items
//!   by id, categories and tags by id or name) are kept as they are.
//!
//! - [`bookmarks`]: bookmark lists only, as a JSON array or a Netscape HTML
//!   file exported by a browser.
//!
//! [`ItemOrchestrator`]: crate::orchestrator::ItemOrchestrator

pub mod bookmarks;
pub mod folder;

pub use bookmarks::{
    export_bookmarks, import_bookmarks, parse_bookmarks, read_bookmarks, BookmarkFormat,
    BookmarkImportReport,
};
pub use folder::{export_library, import_library, ExportReport, ImportReport};

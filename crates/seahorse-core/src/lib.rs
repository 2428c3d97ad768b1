//! # Seahorse Architecture
//!
//! Seahorse is a **UI-agnostic collection library** for bookmarks, saved images
//! and text notes. The command-line client is one consumer; a desktop shell or
//! a share extension would use the same entry points.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (crates/seahorse/src/cli/)                          │
//! │  - Parses arguments, renders output, owns stdout/stderr     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator (orchestrator/)                               │
//! │  - Single write entry point                                 │
//! │  - Name uniqueness, references, image file cleanup          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Cache (cache.rs)                                           │
//! │  - In-memory collections + derived bookmark list            │
//! │  - Write-through: store first, then memory, then notify     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - DataStore trait, CollectionStore over a StorageBackend   │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Beside the stack sits [`paths`], which decides *where* the storage root is
//! (default directory or a user-picked one held open by a scoped grant), and
//! [`init`], which wires everything together once per process.
//!
//! ## Key Principle: Reads From Memory, Writes Through
//!
//! Clients read from [`cache::ItemCache`] only. Every change goes through
//! [`orchestrator::ItemOrchestrator`], which hands it to the cache, which
//! persists it before touching memory. A failed write leaves both the file and
//! the cache as they were.
//!
//! Nothing in this crate writes to stdout or calls `std::process::exit`.
//! Diagnostics go through `tracing`; the client decides where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Store** (`store/`): collection semantics against `MemBackend`, file
//!    format and atomic writes against `FsBackend` in a temp dir.
//! 2. **Cache / Orchestrator**: write-through consistency, the bookmark view,
//!    and the cross-collection rules, all over `MemBackend`.
//! 3. **Paths / Init**: resolver fallback with a fake access provider, and
//!    full start-up against temporary directories.
//!
//! ## Module Overview
//!
//! - [`model`]: Item types (`CollectionItem`, `Bookmark`, `ImageItem`, `TextItem`)
//! - [`taxonomy`]: Categories, tags, name and color validation
//! - [`store`]: Storage abstraction and backends
//! - [`cache`]: Reactive in-memory cache and change events
//! - [`orchestrator`]: The write entry point for clients
//! - [`paths`]: Storage root resolution, scoped grants, directory layout
//! - [`backup`]: Compressed snapshots of the collections
//! - [`relocate`]: Copying data files between roots
//! - [`transfer`]: Export folders and bookmark files, in and out
//! - [`config`]: Configuration management
//! - [`url`]: Bookmark URL comparison keys
//! - [`init`]: Composition root
//! - [`error`]: Error types

pub mod backup;
pub mod cache;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod orchestrator;
pub mod paths;
pub mod relocate;
pub mod store;
pub mod taxonomy;
pub mod transfer;
pub mod url;

#[cfg(test)]
pub(crate) mod test_utils;

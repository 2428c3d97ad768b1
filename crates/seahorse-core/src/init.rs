//! # Composition Root
//!
//! [`initialize`] is the only place that wires the services together. Nothing
//! in the library holds global state; everything hangs off the returned
//! [`SeahorseContext`].
//!
//! ## Startup Sequence
//!
//! 1. Build the [`PathResolver`] over the settings file in the config directory.
//! 2. Resolve the storage root (selected location or default, never fails).
//! 3. Load `seahorse.toml` from the config directory and the storage root, merged.
//! 4. Create `Data/`, `Images/` and `Backups/` under the root.
//! 5. Open the store and fill the cache.
//!
//! ## Environment Variables
//!
//! * `SEAHORSE_DATA_DIR` - Overrides the default storage root.
//! * `SEAHORSE_CONFIG_DIR` - Overrides the config directory (settings and `seahorse.toml`).
//!
//! Both exist primarily so tests can run against temporary directories.
//!
//! ## Switching Roots
//!
//! [`SeahorseContext::relocate`] flushes every collection, copies the data
//! files into `<dir>/Seahorse`, persists the new location, swaps the grant
//! and reopens the store there. [`SeahorseContext::reset_location`] does the
//! same towards the default root.

use crate::backup::{self, BackupReport};
use crate::config::{SeahorseConfig, CONFIG_FILE};
use crate::error::Result;
use crate::orchestrator::ItemOrchestrator;
use crate::paths::{
    self, DefaultResolver, PathResolver, PlainDirectoryAccess, ResolvedRoot, SettingsFile,
    StorageLayout, APP_DIR,
};
use crate::relocate::{migrate_data, MigrationResult};
use crate::store::fs_backend::FsBackend;
use crate::store::CollectionStore;
use clapfig::{Clapfig, SearchMode, SearchPath};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub type FsStore = CollectionStore<FsBackend>;

pub struct SeahorseContext {
    pub orchestrator: ItemOrchestrator<FsStore>,
    pub config: SeahorseConfig,
    resolver: DefaultResolver,
    root: ResolvedRoot,
    config_dir: PathBuf,
}

/// Initializes Seahorse using the OS (or environment-overridden) directories.
pub fn initialize() -> SeahorseContext {
    initialize_with(paths::config_dir(), paths::default_root())
}

/// Initializes Seahorse with explicit config directory and default root.
pub fn initialize_with(config_dir: PathBuf, default_root: PathBuf) -> SeahorseContext {
    let mut resolver = PathResolver::new(
        PlainDirectoryAccess,
        SettingsFile::in_dir(&config_dir),
        default_root,
    );
    let root = resolver.resolve_root();
    let config = load_config(&config_dir, &root.path);
    let orchestrator = open_orchestrator(&root.path, &config);

    info!(
        root = %root.path.display(),
        scoped = root.scoped,
        "Seahorse initialized"
    );

    SeahorseContext {
        orchestrator,
        config,
        resolver,
        root,
        config_dir,
    }
}

fn load_config(config_dir: &Path, root: &Path) -> SeahorseConfig {
    // Root config overrides the user config
    let search_paths = vec![
        SearchPath::Path(config_dir.to_path_buf()),
        SearchPath::Path(root.to_path_buf()),
    ];

    let config: SeahorseConfig = Clapfig::builder()
        .app_name("seahorse")
        .file_name(CONFIG_FILE)
        .search_paths(search_paths)
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default();
    config
}

fn open_store(root: &Path, config: &SeahorseConfig) -> (FsStore, StorageLayout) {
    let layout = StorageLayout::new(root);
    if let Err(e) = layout.ensure_directories() {
        error!(root = %root.display(), error = %e, "Could not create storage directories");
    }
    let backend = FsBackend::new(layout.data_dir()).with_pretty_json(config.pretty_json);
    let store = CollectionStore::open_with(backend, config.seed_default_categories);
    (store, layout)
}

fn open_orchestrator(root: &Path, config: &SeahorseConfig) -> ItemOrchestrator<FsStore> {
    let (store, layout) = open_store(root, config);
    ItemOrchestrator::new(store, layout).with_defaults(config.taxonomy_defaults())
}

impl SeahorseContext {
    pub fn root(&self) -> &ResolvedRoot {
        &self.root
    }

    pub fn layout(&self) -> &StorageLayout {
        self.orchestrator.layout()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn default_root(&self) -> &Path {
        self.resolver.default_root()
    }

    /// Writes a backup archive and prunes old ones per `backup_keep`.
    pub fn backup(&self) -> Result<BackupReport> {
        backup::create_backup(
            self.orchestrator.store(),
            self.layout(),
            self.config.backup_keep,
        )
    }

    /// Moves the library to `<dir>/Seahorse` and reopens it there.
    pub fn relocate(&mut self, dir: &Path) -> Result<MigrationResult> {
        self.orchestrator.force_save_all()?;

        let target = StorageLayout::new(dir.join(APP_DIR));
        target.ensure_directories()?;
        let result = migrate_data(self.layout(), &target);

        self.root = self.resolver.switch_root(dir)?;
        self.reopen();
        Ok(result)
    }

    /// Forgets the selected location and reopens the library at the default root.
    pub fn reset_location(&mut self) -> Result<MigrationResult> {
        self.orchestrator.force_save_all()?;

        let target = StorageLayout::new(self.resolver.default_root());
        let result = if target.root() == self.layout().root() {
            MigrationResult::default()
        } else {
            target.ensure_directories()?;
            migrate_data(self.layout(), &target)
        };

        self.root = self.resolver.reset_to_default()?;
        self.reopen();
        Ok(result)
    }

    fn reopen(&mut self) {
        self.config = load_config(&self.config_dir, &self.root.path);
        let (store, layout) = open_store(&self.root.path, &self.config);
        self.orchestrator
            .reopen(store, layout, self.config.taxonomy_defaults());
        info!(root = %self.root.path.display(), "Storage root switched");
    }

    /// Flushes all collections and releases the scoped grant.
    pub fn shutdown(mut self) {
        if let Err(e) = self.orchestrator.force_save_all() {
            error!(error = %e, "Final flush failed");
        }
        self.resolver.release();
    }
}

//! # Storage Location
//!
//! Seahorse keeps its data either in the OS per-app data directory or in a
//! directory the user picked. A picked directory may live outside the
//! application's sandbox, in which case the platform hands out a revocable
//! grant that must be held for as long as the files are in use.
//!
//! ## Resolution
//!
//! [`PathResolver::resolve_root`] never fails:
//!
//! 1. Load the saved location token (key [`tokens::STORAGE_TOKEN_KEY`]).
//! 2. Resolve it. A stale token is not used.
//! 3. Ask for access. On success the root is `<picked>/Seahorse` and the
//!    resolver keeps the grant.
//! 4. Any miss along the way is logged and the default root is used instead.
//!
//! While a grant is held, resolving again returns the same root without asking
//! the platform a second time. Switching roots releases the old grant before
//! acquiring the new one.
//!
//! ## Default Root
//!
//! 1. `SEAHORSE_DATA_DIR` environment variable (primarily for testing).
//! 2. The OS data directory via the `directories` crate.
//! 3. `./.seahorse` as a last resort.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! ├── Data/      # one JSON file per collection
//! ├── Images/    # image files owned by the store
//! └── Backups/   # compressed snapshots
//! ```

pub mod access;
pub mod layout;
pub mod tokens;

pub use access::{PlainDirectoryAccess, ResolvedToken, ScopedAccess, ScopedGrant, APP_DIR};
pub use layout::{AssetLocation, StorageLayout, IMAGE_EXTENSIONS};
pub use tokens::{MemoryTokenStore, SettingsFile, TokenStore, STORAGE_TOKEN_KEY};

use crate::error::Result;
use directories::{BaseDirs, ProjectDirs};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const DATA_DIR_ENV: &str = "SEAHORSE_DATA_DIR";
pub const CONFIG_DIR_ENV: &str = "SEAHORSE_CONFIG_DIR";

/// The outcome of [`PathResolver::resolve_root`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoot {
    pub path: PathBuf,
    /// True when the root is held open by a scoped grant.
    pub scoped: bool,
}

/// Default storage root, see the module docs for the lookup order.
pub fn default_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dirs) = ProjectDirs::from("com", "seahorse", "Seahorse") {
        return dirs.data_dir().to_path_buf();
    }
    warn!("Could not determine OS data directory, using working directory");
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".seahorse")
}

/// Directory for settings and `seahorse.toml`.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dirs) = ProjectDirs::from("com", "seahorse", "Seahorse") {
        return dirs.config_dir().to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".seahorse")
}

/// Abbreviates the home directory as `~` for display.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = BaseDirs::new().map(|bd| bd.home_dir().to_path_buf()) {
        if let Ok(rest) = path.strip_prefix(&home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// Resolves the storage root and owns the single active scoped grant.
pub struct PathResolver<A: ScopedAccess, T: TokenStore> {
    access: Rc<A>,
    tokens: T,
    default_root: PathBuf,
    active: Option<ScopedGrant<A>>,
}

impl<A: ScopedAccess, T: TokenStore> PathResolver<A, T> {
    pub fn new(access: A, tokens: T, default_root: PathBuf) -> Self {
        Self {
            access: Rc::new(access),
            tokens,
            default_root,
            active: None,
        }
    }

    pub fn default_root(&self) -> &Path {
        &self.default_root
    }

    pub fn has_active_grant(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_grant(&self) -> Option<&ScopedGrant<A>> {
        self.active.as_ref()
    }

    pub fn resolve_root(&mut self) -> ResolvedRoot {
        if let Some(grant) = &self.active {
            return ResolvedRoot {
                path: grant.storage_root(),
                scoped: true,
            };
        }

        match self.acquire() {
            Some(grant) => {
                let path = grant.storage_root();
                info!(root = %path.display(), "Using selected storage location");
                self.active = Some(grant);
                ResolvedRoot { path, scoped: true }
            }
            None => {
                debug!(root = %self.default_root.display(), "Using default storage location");
                ResolvedRoot {
                    path: self.default_root.clone(),
                    scoped: false,
                }
            }
        }
    }

    fn acquire(&self) -> Option<ScopedGrant<A>> {
        let token = match self.tokens.load(STORAGE_TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Could not read saved storage location");
                return None;
            }
        };

        let resolved = match self.access.resolve_token(&token) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "Saved storage location could not be resolved");
                return None;
            }
        };

        if resolved.is_stale {
            warn!(path = %resolved.path.display(), "Saved storage location is stale");
            return None;
        }

        if !self.access.start_access(&resolved.path) {
            warn!(path = %resolved.path.display(), "Access to saved storage location denied");
            return None;
        }

        let grant = ScopedGrant::new(resolved.path, Rc::clone(&self.access));
        let storage = grant.storage_root();
        if !storage.is_dir() {
            info!(path = %storage.display(), "Storage directory does not exist yet");
        } else if let Err(e) = std::fs::read_dir(&storage) {
            warn!(path = %storage.display(), error = %e, "Storage directory is not readable");
        }
        Some(grant)
    }

    /// Releases the active grant, if any.
    pub fn release(&mut self) {
        if let Some(grant) = self.active.take() {
            grant.release();
        }
    }

    /// Persists `dir` as the new location, releases the old grant and resolves again.
    pub fn switch_root(&mut self, dir: &Path) -> Result<ResolvedRoot> {
        let token = self.access.create_token(dir)?;
        self.tokens.save(STORAGE_TOKEN_KEY, &token)?;
        self.release();
        Ok(self.resolve_root())
    }

    /// Forgets the saved location and returns to the default root.
    pub fn reset_to_default(&mut self) -> Result<ResolvedRoot> {
        self.tokens.remove(STORAGE_TOKEN_KEY)?;
        self.release();
        Ok(self.resolve_root())
    }
}

pub type DefaultResolver = PathResolver<PlainDirectoryAccess, SettingsFile>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Plain directory access that counts grant traffic.
    #[derive(Default)]
    struct CountingAccess {
        starts: Cell<usize>,
        stops: Cell<usize>,
    }

    impl ScopedAccess for CountingAccess {
        fn create_token(&self, dir: &Path) -> Result<Vec<u8>> {
            PlainDirectoryAccess.create_token(dir)
        }

        fn resolve_token(&self, token: &[u8]) -> Result<ResolvedToken> {
            PlainDirectoryAccess.resolve_token(token)
        }

        fn start_access(&self, path: &Path) -> bool {
            self.starts.set(self.starts.get() + 1);
            path.is_dir()
        }

        fn stop_access(&self, _path: &Path) {
            self.stops.set(self.stops.get() + 1);
        }
    }

    fn token_for(path: &Path) -> MemoryTokenStore {
        MemoryTokenStore::with_token(STORAGE_TOKEN_KEY, path.to_str().unwrap().as_bytes())
    }

    #[test]
    fn test_absent_token_uses_default() {
        let dir = TempDir::new().unwrap();
        let mut resolver = PathResolver::new(
            CountingAccess::default(),
            MemoryTokenStore::new(),
            dir.path().to_path_buf(),
        );
        let root = resolver.resolve_root();
        assert_eq!(root.path, dir.path());
        assert!(!root.scoped);
        assert!(!resolver.has_active_grant());
    }

    #[test]
    fn test_stale_token_uses_default() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("unplugged-drive");
        let mut resolver = PathResolver::new(
            CountingAccess::default(),
            token_for(&missing),
            dir.path().join("default"),
        );
        let root = resolver.resolve_root();
        assert_eq!(root.path, dir.path().join("default"));
        assert!(!root.scoped);
        assert!(resolver.active_grant().is_none());
    }

    #[test]
    fn test_valid_token_grants_app_subdirectory() {
        let dir = TempDir::new().unwrap();
        let picked = dir.path().join("picked");
        std::fs::create_dir(&picked).unwrap();

        let mut resolver = PathResolver::new(
            CountingAccess::default(),
            token_for(&picked),
            dir.path().join("default"),
        );
        let root = resolver.resolve_root();
        assert_eq!(root.path, picked.join(APP_DIR));
        assert!(root.scoped);
    }

    #[test]
    fn test_resolve_is_idempotent_and_release_happens_once() {
        let dir = TempDir::new().unwrap();
        let picked = dir.path().join("picked");
        std::fs::create_dir(&picked).unwrap();

        let mut resolver = PathResolver::new(
            CountingAccess::default(),
            token_for(&picked),
            dir.path().join("default"),
        );
        resolver.resolve_root();
        resolver.resolve_root();
        resolver.resolve_root();
        assert_eq!(resolver.access.starts.get(), 1);

        resolver.release();
        resolver.release();
        assert_eq!(resolver.access.stops.get(), 1);
    }

    #[test]
    fn test_drop_releases_active_grant() {
        let dir = TempDir::new().unwrap();
        let picked = dir.path().join("picked");
        std::fs::create_dir(&picked).unwrap();

        let access = Rc::new(CountingAccess::default());
        {
            let grant = ScopedGrant::new(picked.clone(), Rc::clone(&access));
            assert_eq!(grant.granted_path(), picked.as_path());
        }
        assert_eq!(access.stops.get(), 1);
    }

    #[test]
    fn test_switch_root_releases_previous_grant_first() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::create_dir(&first).unwrap();
        std::fs::create_dir(&second).unwrap();

        let mut resolver = PathResolver::new(
            CountingAccess::default(),
            token_for(&first),
            dir.path().join("default"),
        );
        assert_eq!(resolver.resolve_root().path, first.join(APP_DIR));

        let root = resolver.switch_root(&second).unwrap();
        assert_eq!(root.path, second.join(APP_DIR));
        assert_eq!(resolver.access.stops.get(), 1);
        assert_eq!(resolver.access.starts.get(), 2);
    }

    #[test]
    fn test_reset_to_default_forgets_token() {
        let dir = TempDir::new().unwrap();
        let picked = dir.path().join("picked");
        std::fs::create_dir(&picked).unwrap();

        let mut resolver = PathResolver::new(
            CountingAccess::default(),
            token_for(&picked),
            dir.path().join("default"),
        );
        assert!(resolver.resolve_root().scoped);

        let root = resolver.reset_to_default().unwrap();
        assert_eq!(root.path, dir.path().join("default"));
        assert!(!root.scoped);
        assert!(resolver.tokens.load(STORAGE_TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn test_switch_to_missing_dir_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut resolver = PathResolver::new(
            PlainDirectoryAccess,
            MemoryTokenStore::new(),
            dir.path().to_path_buf(),
        );
        assert!(resolver.switch_root(&dir.path().join("nope")).is_err());
        assert!(!resolver.has_active_grant());
    }
}

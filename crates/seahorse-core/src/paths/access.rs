use crate::error::{Result, SeahorseError};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// Name of the directory created inside a user-selected location.
pub const APP_DIR: &str = "Seahorse";

/// What a persisted token points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub path: PathBuf,
    /// The token still resolved, but should be re-created before it stops working.
    pub is_stale: bool,
}

/// Platform capability for reaching directories outside the default sandbox.
pub trait ScopedAccess {
    /// Produces an opaque token that can later reopen `dir`.
    fn create_token(&self, dir: &Path) -> Result<Vec<u8>>;

    fn resolve_token(&self, token: &[u8]) -> Result<ResolvedToken>;

    /// Returns false when the platform refuses access.
    fn start_access(&self, path: &Path) -> bool;

    fn stop_access(&self, path: &Path);
}

/// Scoped access for platforms without a sandbox.
///
/// The token is the directory's absolute path as UTF-8. A token whose
/// directory no longer exists is stale, and access is granted iff the
/// directory exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainDirectoryAccess;

impl ScopedAccess for PlainDirectoryAccess {
    fn create_token(&self, dir: &Path) -> Result<Vec<u8>> {
        if !dir.is_absolute() || !dir.is_dir() {
            return Err(SeahorseError::AccessDenied(dir.to_path_buf()));
        }
        let text = dir
            .to_str()
            .ok_or_else(|| SeahorseError::AccessDenied(dir.to_path_buf()))?;
        Ok(text.as_bytes().to_vec())
    }

    fn resolve_token(&self, token: &[u8]) -> Result<ResolvedToken> {
        let text = std::str::from_utf8(token)
            .map_err(|e| SeahorseError::Store(format!("unreadable location token: {}", e)))?;
        let path = PathBuf::from(text);
        if !path.is_absolute() {
            return Err(SeahorseError::Store(format!(
                "location token is not absolute: {}",
                text
            )));
        }
        let is_stale = !path.is_dir();
        Ok(ResolvedToken { path, is_stale })
    }

    fn start_access(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn stop_access(&self, _path: &Path) {}
}

/// An active scoped-access grant.
///
/// Released exactly once: either explicitly through [`ScopedGrant::release`]
/// or when dropped.
pub struct ScopedGrant<A: ScopedAccess> {
    granted: PathBuf,
    access: Rc<A>,
    released: bool,
}

impl<A: ScopedAccess> ScopedGrant<A> {
    pub(crate) fn new(granted: PathBuf, access: Rc<A>) -> Self {
        debug!(path = %granted.display(), "Scoped access granted");
        Self {
            granted,
            access,
            released: false,
        }
    }

    /// The directory the user selected.
    pub fn granted_path(&self) -> &Path {
        &self.granted
    }

    /// The app directory inside the granted location.
    pub fn storage_root(&self) -> PathBuf {
        self.granted.join(APP_DIR)
    }

    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if self.released {
            return;
        }
        self.access.stop_access(&self.granted);
        self.released = true;
        debug!(path = %self.granted.display(), "Scoped access released");
    }
}

impl<A: ScopedAccess> Drop for ScopedGrant<A> {
    fn drop(&mut self) {
        self.stop();
    }
}

use crate::error::Result;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// Key under which the storage location token is persisted.
pub const STORAGE_TOKEN_KEY: &str = "seahorse.storage.bookmarkData";

pub const SETTINGS_FILE: &str = "settings.json";

/// Persistence for opaque location tokens.
pub trait TokenStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn save(&mut self, key: &str, token: &[u8]) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Tokens kept in a small JSON file, normally in the OS config directory.
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An unparseable file reads as empty, so the next save replaces it.
    fn read(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable settings file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Atomic write
        let tmp_file = dir.join(format!(".{}-{}.tmp", SETTINGS_FILE, Uuid::new_v4()));
        fs::write(&tmp_file, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp_file, &self.path)?;
        Ok(())
    }
}

impl TokenStore for SettingsFile {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.remove(key))
    }

    fn save(&mut self, key: &str, token: &[u8]) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), token.to_vec());
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(key: &str, token: &[u8]) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), token.to_vec());
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, token: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), token.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

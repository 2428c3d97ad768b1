use crate::error::{Result, SeahorseError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use url::Url;
use uuid::Uuid;

pub const DATA_DIR: &str = "Data";
pub const ASSETS_DIR: &str = "Images";
pub const BACKUPS_DIR: &str = "Backups";

/// File extensions accepted by [`StorageLayout::import_asset`], lowercase.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "heic", "heif", "bmp", "tiff", "webp",
];

/// Where a stored image path points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Remote(String),
    Local(PathBuf),
}

/// The fixed directory tree under a storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    /// Creates the data, assets and backups directories. Safe to call repeatedly.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [self.data_dir(), self.assets_dir(), self.backups_dir()] {
            fs::create_dir_all(&dir)?;
        }
        debug!(root = %self.root.display(), "Storage directories ready");
        Ok(())
    }

    /// Maps a stored image path to something that can be opened.
    ///
    /// Remote URLs are returned unchanged. An existing `file://` URL or
    /// absolute path is used as-is; a missing one falls back to its filename
    /// inside the assets directory, where a relocated library keeps its
    /// images. Anything else is a filename inside the assets directory.
    pub fn resolve_asset_path(&self, stored: &str) -> AssetLocation {
        match self.stored_asset_path(stored) {
            AssetLocation::Local(path) if !path.exists() && !self.is_managed_asset(&path) => {
                match path.file_name() {
                    Some(name) if path.is_absolute() => {
                        AssetLocation::Local(self.assets_dir().join(name))
                    }
                    _ => AssetLocation::Local(path),
                }
            }
            other => other,
        }
    }

    /// Like [`resolve_asset_path`](Self::resolve_asset_path) without the
    /// filename fallback: the location exactly as recorded.
    pub fn stored_asset_path(&self, stored: &str) -> AssetLocation {
        if stored.starts_with("http://") || stored.starts_with("https://") {
            return AssetLocation::Remote(stored.to_string());
        }
        if let Some(path) = file_url_path(stored) {
            return AssetLocation::Local(path);
        }
        let path = Path::new(stored);
        if path.is_absolute() {
            return AssetLocation::Local(path.to_path_buf());
        }
        AssetLocation::Local(self.assets_dir().join(stored))
    }

    /// Copies an image file into the assets directory as `<uuid>.<ext>` and
    /// returns the new filename.
    ///
    /// Fails with `InvalidInput` for extensions outside [`IMAGE_EXTENSIONS`].
    pub fn import_asset(&self, source: &Path) -> Result<String> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| {
                SeahorseError::InvalidInput(format!(
                    "{} is not a supported image file",
                    source.display()
                ))
            })?;

        let assets = self.assets_dir();
        fs::create_dir_all(&assets)?;
        let name = format!("{}.{}", Uuid::new_v4().simple(), ext);
        fs::copy(source, assets.join(&name))?;
        debug!(source = %source.display(), name = %name, "Image copied into the library");
        Ok(name)
    }

    /// Reduces a path inside the assets directory to its filename, so the
    /// stored record survives a change of storage root. Other values are
    /// returned unchanged.
    pub fn relative_asset_name(&self, stored: &str) -> String {
        let candidate = match file_url_path(stored) {
            Some(path) => path,
            None => PathBuf::from(stored),
        };
        if candidate.is_absolute() && self.is_managed_asset(&candidate) {
            if let Ok(rest) = candidate.strip_prefix(self.assets_dir()) {
                if let Some(name) = rest.to_str() {
                    return name.to_string();
                }
            }
        }
        stored.to_string()
    }

    /// True if `path` lies strictly inside the assets directory.
    ///
    /// The comparison is per path component and any `..` component is
    /// rejected, so `Images-old/x.png` and `Images/../Data/items.json` are
    /// both outside.
    pub fn is_managed_asset(&self, path: &Path) -> bool {
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return false;
        }
        let assets = self.assets_dir();
        path.starts_with(&assets) && path != assets
    }
}

fn file_url_path(stored: &str) -> Option<PathBuf> {
    if !stored.starts_with("file://") {
        return None;
    }
    Url::parse(stored).ok()?.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path().join("root"));
        layout.ensure_directories().unwrap();
        layout.ensure_directories().unwrap();
        assert!(layout.data_dir().is_dir());
        assert!(layout.assets_dir().is_dir());
        assert!(layout.backups_dir().is_dir());
    }

    #[test]
    fn test_resolve_asset_path() {
        let layout = StorageLayout::new("/store");
        assert_eq!(
            layout.resolve_asset_path("https://cdn.example.com/a.png"),
            AssetLocation::Remote("https://cdn.example.com/a.png".into())
        );
        assert_eq!(
            layout.resolve_asset_path("cat.png"),
            AssetLocation::Local(PathBuf::from("/store/Images/cat.png"))
        );
        assert_eq!(
            layout.stored_asset_path("/elsewhere/dog.png"),
            AssetLocation::Local(PathBuf::from("/elsewhere/dog.png"))
        );
        assert_eq!(
            layout.stored_asset_path("file:///elsewhere/dog.png"),
            AssetLocation::Local(PathBuf::from("/elsewhere/dog.png"))
        );
    }

    #[test]
    fn test_missing_absolute_path_falls_back_to_assets_dir() {
        let dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path().join("root"));
        let outside = dir.path().join("photo.png");
        fs::write(&outside, b"png").unwrap();

        assert_eq!(
            layout.resolve_asset_path(outside.to_str().unwrap()),
            AssetLocation::Local(outside.clone())
        );
        assert_eq!(
            layout.resolve_asset_path("/old-root/Images/moved.png"),
            AssetLocation::Local(layout.assets_dir().join("moved.png"))
        );
        assert_eq!(
            layout.resolve_asset_path("file:///old-root/Images/moved.png"),
            AssetLocation::Local(layout.assets_dir().join("moved.png"))
        );
    }

    #[test]
    fn test_import_asset_copies_with_fresh_name() {
        let dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path().join("root"));
        let source = dir.path().join("Holiday.JPG");
        fs::write(&source, b"jpg").unwrap();

        let name = layout.import_asset(&source).unwrap();
        assert!(name.ends_with(".jpg"));
        assert_ne!(name, "Holiday.JPG");
        assert_eq!(fs::read(layout.assets_dir().join(&name)).unwrap(), b"jpg");
        assert!(source.exists());

        let second = layout.import_asset(&source).unwrap();
        assert_ne!(name, second);
    }

    #[test]
    fn test_import_asset_rejects_other_files() {
        let dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path().join("root"));
        let source = dir.path().join("notes.txt");
        fs::write(&source, b"text").unwrap();

        let err = layout.import_asset(&source).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Invalid);
        assert!(!layout.assets_dir().exists());
    }

    #[test]
    fn test_relative_asset_name() {
        let layout = StorageLayout::new("/store");
        assert_eq!(layout.relative_asset_name("/store/Images/cat.png"), "cat.png");
        assert_eq!(
            layout.relative_asset_name("file:///store/Images/cat.png"),
            "cat.png"
        );
        assert_eq!(
            layout.relative_asset_name("/elsewhere/dog.png"),
            "/elsewhere/dog.png"
        );
        assert_eq!(layout.relative_asset_name("cat.png"), "cat.png");
    }

    #[test]
    fn test_is_managed_asset() {
        let layout = StorageLayout::new("/store");
        assert!(layout.is_managed_asset(Path::new("/store/Images/cat.png")));
        assert!(!layout.is_managed_asset(Path::new("/store/Images")));
        assert!(!layout.is_managed_asset(Path::new("/store/Images-old/cat.png")));
        assert!(!layout.is_managed_asset(Path::new("/store/Images/../Data/items.json")));
        assert!(!layout.is_managed_asset(Path::new("/tmp/cat.png")));
    }
}

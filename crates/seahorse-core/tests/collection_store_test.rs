use seahorse_core::model::{Bookmark, CollectionItem, ImageItem, TextItem};
use seahorse_core::store::fs_backend::FsBackend;
use seahorse_core::store::{CollectionStore, DataStore, StorageBackend};
use seahorse_core::taxonomy::{Category, Tag};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, CollectionStore<FsBackend>) {
    let dir = TempDir::new().unwrap();
    let store = CollectionStore::open(FsBackend::new(dir.path().join("Data")));
    (dir, store)
}

fn reopen(dir: &TempDir) -> CollectionStore<FsBackend> {
    CollectionStore::open(FsBackend::new(dir.path().join("Data")))
}

#[test]
fn test_all_collections_survive_reopen() {
    let (dir, mut store) = setup();
    let work = Category::new("Work");
    let tag = Tag::new("rust");
    store.save_category(&work).unwrap();
    store.save_tag(&tag).unwrap();

    let mut bookmark = Bookmark::new("Rust", "https://rust-lang.org").in_category(work.id);
    bookmark.meta.add_tag(tag.id);
    store.save_bookmark(&bookmark).unwrap();
    store.save_item(&TextItem::new("a note").into()).unwrap();
    store.save_item(&ImageItem::new("cat.png").into()).unwrap();
    store.set_preference("sort", "added").unwrap();

    let store = reopen(&dir);
    let items = store.fetch_all_items().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], CollectionItem::Bookmark(bookmark.clone()));
    assert!(matches!(items[1], CollectionItem::Text(_)));
    assert!(matches!(items[2], CollectionItem::Image(_)));

    assert_eq!(store.fetch_bookmarks_by_category(&work.id).unwrap(), vec![bookmark.clone()]);
    assert_eq!(store.fetch_bookmarks_by_tag(&tag.id).unwrap(), vec![bookmark]);
    assert_eq!(store.fetch_all_categories().unwrap().len(), 4);
    assert_eq!(store.preference("sort").unwrap().as_deref(), Some("added"));
}

#[test]
fn test_default_categories_seeded_once() {
    let (dir, mut store) = setup();
    let names: Vec<String> = store
        .fetch_all_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["All Bookmarks", "Favorites", "None"]);

    let favorites = store.fetch_all_categories().unwrap()[1].id;
    store.delete_category(&favorites).unwrap();

    let store = reopen(&dir);
    assert_eq!(store.fetch_all_categories().unwrap().len(), 2);
}

#[test]
fn test_duplicate_names_rejected_by_store() {
    let (_dir, mut store) = setup();
    store.save_tag(&Tag::new("Reading")).unwrap();
    assert!(store.save_tag(&Tag::new("reading")).is_err());
    assert!(store.tag_exists("READING"));
    assert!(store.category_exists("favorites"));
    assert!(!store.category_exists("Work"));
}

#[test]
fn test_collection_files_are_json_arrays() {
    let (dir, mut store) = setup();
    store.save_item(&TextItem::new("hello").into()).unwrap();
    store.force_save_all().unwrap();

    let data = dir.path().join("Data");
    for file in ["items.json", "categories.json", "tags.json"] {
        let raw = fs::read_to_string(data.join(file)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array(), "{} should hold an array", file);
    }
    let raw = fs::read_to_string(data.join("preferences.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.is_object());
}

#[test]
fn test_corrupt_items_file_loads_empty_and_keeps_working() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("Data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("items.json"), "{ not json").unwrap();

    let mut store = CollectionStore::open(FsBackend::new(&data));
    assert!(store.fetch_all_items().unwrap().is_empty());
    store.save_item(&TextItem::new("fresh").into()).unwrap();

    let backend = FsBackend::new(&data);
    assert_eq!(backend.load_items().unwrap().unwrap().len(), 1);
}

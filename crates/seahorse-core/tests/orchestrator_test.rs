use seahorse_core::error::ErrorKind;
use seahorse_core::model::{Bookmark, CollectionItem, ImageItem, TextItem};
use seahorse_core::orchestrator::ItemOrchestrator;
use seahorse_core::paths::StorageLayout;
use seahorse_core::store::fs_backend::FsBackend;
use seahorse_core::store::mem_backend::MemBackend;
use seahorse_core::store::{CollectionStore, DataStore};
use seahorse_core::taxonomy::{Category, Tag};
use std::fs;
use tempfile::TempDir;

type FsOrchestrator = ItemOrchestrator<CollectionStore<FsBackend>>;

fn open(dir: &TempDir) -> FsOrchestrator {
    let layout = StorageLayout::new(dir.path());
    layout.ensure_directories().unwrap();
    let store = CollectionStore::open(FsBackend::new(layout.data_dir()));
    ItemOrchestrator::new(store, layout)
}

#[test]
fn test_cache_matches_disk_after_mixed_operations() {
    let dir = TempDir::new().unwrap();
    let mut orch = open(&dir);

    let work = orch.add_category(Category::new("Work")).unwrap();
    let tag = orch.add_tag(Tag::new("later")).unwrap();
    let a = orch
        .add_bookmark(Bookmark::new("A", "https://a.com").in_category(work.id))
        .unwrap();
    let note = orch.add_item(TextItem::new("remember").into()).unwrap();
    orch.add_tag_to_bookmark(&a.id(), &tag.id).unwrap();
    orch.set_favorite(&note.id(), true).unwrap();
    orch.rename_tag(&tag.id, "Later").unwrap();

    let fresh = open(&dir);
    assert_eq!(orch.cache().items(), fresh.cache().items());
    assert_eq!(orch.cache().bookmarks(), fresh.cache().bookmarks());
    assert_eq!(orch.cache().categories(), fresh.cache().categories());
    assert_eq!(orch.cache().tags(), fresh.cache().tags());
}

#[test]
fn test_bookmark_list_is_the_bookmark_subset_of_items() {
    let dir = TempDir::new().unwrap();
    let mut orch = open(&dir);
    orch.add_item(TextItem::new("t").into()).unwrap();
    let b1 = orch
        .add_bookmark(Bookmark::new("B1", "https://one.example"))
        .unwrap();
    orch.add_item(ImageItem::new("x.png").into()).unwrap();
    let b2 = orch
        .add_item(Bookmark::new("B2", "https://two.example").into())
        .unwrap();

    let from_items: Vec<&Bookmark> = orch
        .cache()
        .items()
        .iter()
        .filter_map(CollectionItem::as_bookmark)
        .collect();
    let view: Vec<&Bookmark> = orch.cache().bookmarks().iter().collect();
    assert_eq!(from_items, view);
    assert_eq!(view[0].id(), b1.id());
    assert_eq!(view[1].id(), b2.id());

    orch.delete_item(&b1.id()).unwrap();
    assert_eq!(orch.cache().bookmarks().len(), 1);
    assert_eq!(orch.cache().items().len(), 3);
}

#[test]
fn test_failed_write_leaves_cache_and_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let layout = StorageLayout::new(dir.path());
    let mut orch = ItemOrchestrator::new(CollectionStore::open(MemBackend::new()), layout);
    let kept = orch
        .add_bookmark(Bookmark::new("Kept", "https://kept.example"))
        .unwrap();

    orch.store().backend().set_simulate_write_error(true);
    let err = orch
        .add_bookmark(Bookmark::new("Lost", "https://lost.example"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(orch.add_tag(Tag::new("nope")).is_err());
    assert!(orch.delete_item(&kept.id()).is_err());

    assert_eq!(orch.cache().bookmarks(), &[kept.clone()]);
    assert_eq!(orch.store().fetch_bookmarks().unwrap(), vec![kept]);
    assert!(orch.cache().tags().is_empty());
}

#[test]
fn test_events_follow_successful_writes_only() {
    let dir = TempDir::new().unwrap();
    let mut orch = open(&dir);
    let mut events = orch.subscribe();

    orch.add_bookmark(Bookmark::new("A", "https://a.com"))
        .unwrap();
    assert!(orch.add_category(Category::new("favorites")).is_err());
    orch.add_tag(Tag::new("t")).unwrap();

    let first = events.try_recv().unwrap();
    let second = events.try_recv().unwrap();
    assert!(matches!(first, seahorse_core::cache::CacheEvent::ItemAdded { .. }));
    assert!(matches!(second, seahorse_core::cache::CacheEvent::TagsChanged));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_deleting_image_only_touches_managed_files() {
    let dir = TempDir::new().unwrap();
    let outside_dir = TempDir::new().unwrap();
    let mut orch = open(&dir);

    let managed = orch.layout().assets_dir().join("photo.jpg");
    fs::write(&managed, b"jpg").unwrap();
    let foreign = outside_dir.path().join("photo.jpg");
    fs::write(&foreign, b"jpg").unwrap();

    let inside = orch
        .add_item(ImageItem::new(managed.to_str().unwrap()).into())
        .unwrap();
    let outside = orch
        .add_item(ImageItem::new(foreign.to_str().unwrap()).into())
        .unwrap();
    let remote = orch
        .add_item(ImageItem::new("https://example.com/photo.jpg").into())
        .unwrap();

    for item in [&inside, &outside, &remote] {
        orch.delete_item(&item.id()).unwrap();
    }
    assert!(!managed.exists());
    assert!(foreign.exists());
    assert!(orch.cache().items().is_empty());
}

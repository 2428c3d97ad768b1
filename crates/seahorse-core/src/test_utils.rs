use crate::orchestrator::ItemOrchestrator;
use crate::paths::StorageLayout;
use crate::store::mem_backend::MemBackend;
use crate::store::CollectionStore;
use tempfile::TempDir;

pub type MemOrchestrator = ItemOrchestrator<CollectionStore<MemBackend>>;

/// An orchestrator over an in-memory store, with a real layout on disk for
/// asset tests. Keep the `TempDir` alive until the test is done.
pub fn orchestrator() -> (TempDir, MemOrchestrator) {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let layout = StorageLayout::new(temp_dir.path());
    layout
        .ensure_directories()
        .expect("failed to create storage directories");
    let store = CollectionStore::open(MemBackend::new());
    (temp_dir, ItemOrchestrator::new(store, layout))
}

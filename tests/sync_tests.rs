// Pad sessions over a shared store
// Controller/editor sessions, local fallback, mirroring and status messages

use async_trait::async_trait;
use parking_lot::Mutex;
use samspeak_core::{PadMapping, SharedDocument};
use samspeak_storage::{
    DocumentBackend, FileBackend, LocalCache, MemoryBackend, PadSession, SessionRole,
    SharedPadStore, StoreError, WatchStream,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const WAIT: Duration = Duration::from_secs(2);

fn pads(entries: &[(usize, &str)]) -> PadMapping {
    entries.iter().map(|(i, t)| (*i, t.to_string())).collect()
}

async fn wait_until(rx: &mut watch::Receiver<PadMapping>, done: impl Fn(&PadMapping) -> bool) {
    tokio::time::timeout(WAIT, async {
        loop {
            if done(&rx.borrow_and_update()) {
                return;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("session did not observe the expected pads in time");
}

/// A store that is unreachable: reads and writes fail, the watch reports the error.
struct UnreachableBackend;

#[async_trait]
impl DocumentBackend for UnreachableBackend {
    async fn read(&self) -> Result<Option<SharedDocument>, StoreError> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    async fn write(&self, _document: &SharedDocument) -> Result<(), StoreError> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    fn watch(&self) -> WatchStream {
        use futures_util::StreamExt;
        futures_util::stream::once(async { Err(StoreError::Transport("connection refused".to_string())) }).boxed()
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

#[tokio::test]
async fn test_editor_change_reaches_controller() {
    let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
    let controller = PadSession::open(store.clone(), None, SessionRole::Controller).await;
    let editor = PadSession::open(store, None, SessionRole::Editor).await;

    let mut changes = controller.changes();
    assert!(editor.set_text(0, "I need help").await);

    wait_until(&mut changes, |p| p.get(0) == Some("I need help")).await;
    assert_eq!(controller.label(0), "I need help");
}

#[tokio::test]
async fn test_own_writes_are_delivered_back() {
    let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = store.subscribe(move |update| sink.lock().push(update));

    let mapping = pads(&[(0, "Yes"), (1, "No")]);
    assert!(store.save(&mapping).await);

    tokio::time::timeout(WAIT, async {
        while !seen.lock().contains(&Some(mapping.clone())) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    // The missing document is reported first
    assert_eq!(seen.lock()[0], None);
}

#[tokio::test]
async fn test_dropped_subscription_stops_delivery() {
    let backend = Arc::new(MemoryBackend::new());
    let store = SharedPadStore::new(backend.clone());
    let seen = Arc::new(Mutex::new(0usize));
    let sink = seen.clone();
    let sub = store.subscribe(move |_| *sink.lock() += 1);

    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(sub);
    let before = *seen.lock();

    store.save(&pads(&[(0, "After")])).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*seen.lock(), before);
}

#[tokio::test]
async fn test_controller_falls_back_to_local_cache() {
    let cache = Arc::new(LocalCache::temporary().unwrap());
    cache.set(0, "Hello").unwrap();
    cache.set(1, "").unwrap();
    cache.set(3, "Thanks").unwrap();

    let store = SharedPadStore::new(Arc::new(UnreachableBackend));
    let controller = PadSession::open(store.clone(), Some(cache.clone()), SessionRole::Controller).await;
    assert_eq!(controller.pads(), pads(&[(0, "Hello"), (3, "Thanks")]));

    let editor = PadSession::open(store, Some(cache), SessionRole::Editor).await;
    let editor_pads = editor.pads();
    assert_eq!(editor_pads.len(), 6);
    assert_eq!(editor_pads.get(1), Some(""));
    assert_eq!(editor_pads.get(3), Some("Thanks"));
}

#[tokio::test]
async fn test_remote_load_wins_over_cache() {
    let cache = Arc::new(LocalCache::temporary().unwrap());
    cache.set(0, "Stale").unwrap();

    let backend = MemoryBackend::with_document(SharedDocument::stamp(pads(&[(0, "Fresh")])));
    let store = SharedPadStore::new(Arc::new(backend));
    let controller = PadSession::open(store, Some(cache), SessionRole::Controller).await;

    assert_eq!(controller.pads().get(0), Some("Fresh"));
}

#[tokio::test]
async fn test_controller_mirrors_updates_into_cache() {
    let cache = Arc::new(LocalCache::temporary().unwrap());
    let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
    let controller = PadSession::open(store.clone(), Some(cache.clone()), SessionRole::Controller).await;
    let mut changes = controller.changes();

    store.save(&pads(&[(0, "Water"), (2, "Food")])).await;
    wait_until(&mut changes, |p| p.get(2) == Some("Food")).await;

    assert_eq!(cache.get(0).unwrap().as_deref(), Some("Water"));
    assert_eq!(cache.get(2).unwrap().as_deref(), Some("Food"));
}

#[tokio::test]
async fn test_editor_does_not_mirror() {
    let cache = Arc::new(LocalCache::temporary().unwrap());
    let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
    let editor = PadSession::open(store.clone(), Some(cache.clone()), SessionRole::Editor).await;
    let mut changes = editor.changes();

    store.save(&pads(&[(0, "Water")])).await;
    wait_until(&mut changes, |p| p.get(0) == Some("Water")).await;

    assert_eq!(cache.get(0).unwrap(), None);
}

#[tokio::test]
async fn test_editor_status_messages() {
    let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
    let editor = PadSession::open(store, None, SessionRole::Editor).await;

    assert!(editor.status().is_none());

    editor.set_text(0, "Hi").await;
    assert_eq!(editor.status().unwrap().text, "✓ Saved");

    let (index, saved) = editor.add_pad().await;
    assert!(saved);
    assert_eq!(index, 1);
    assert_eq!(editor.status().unwrap().text, "✓ Pad added");

    editor.set_text(1, "Bye").await;
    assert!(editor.reorder(1, 0).await);
    assert_eq!(editor.status().unwrap().text, "✓ Reordered");
    assert_eq!(editor.pads(), pads(&[(0, "Bye"), (1, "Hi")]));

    editor.delete_pad(0).await;
    assert_eq!(editor.status().unwrap().text, "✓ Pad deleted");
    assert_eq!(editor.pads(), pads(&[(1, "Hi")]));
}

#[tokio::test]
async fn test_editor_failure_messages() {
    let store = SharedPadStore::new(Arc::new(UnreachableBackend));
    let editor = PadSession::open(store, None, SessionRole::Editor).await;

    assert!(!editor.set_text(0, "Hi").await);
    let status = editor.status().unwrap();
    assert_eq!(status.text, "✗ Save failed");
    assert!(!status.success);

    assert!(!editor.add_pad().await.1);
    assert_eq!(editor.status().unwrap().text, "✗ Add failed");

    editor.delete_pad(0).await;
    assert_eq!(editor.status().unwrap().text, "✗ Delete failed");

    // The local edit stands even though it was not persisted
    assert_eq!(editor.pads(), pads(&[(1, "")]));
}

#[tokio::test]
async fn test_noop_reorder_does_not_save() {
    let backend = Arc::new(MemoryBackend::new());
    let store = SharedPadStore::new(backend.clone());
    let editor = PadSession::open(store, None, SessionRole::Editor).await;

    assert!(!editor.reorder(0, 0).await);
    assert!(editor.status().is_none());
    assert!(backend.read().await.unwrap().is_none());
}

#[tokio::test]
async fn test_controller_has_no_status() {
    let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
    let controller = PadSession::open(store, None, SessionRole::Controller).await;
    controller.set_text(0, "Hi").await;
    assert!(controller.status().is_none());
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.json");

    {
        let store = SharedPadStore::new(Arc::new(FileBackend::new(&path)));
        assert!(store.save(&pads(&[(0, "Persisted"), (7, "Page two")])).await);
    }

    let store = SharedPadStore::new(Arc::new(FileBackend::new(&path)));
    let session = PadSession::open(store, None, SessionRole::Controller).await;
    let layout = session.layout();
    assert_eq!(layout.total_slots, 8);
    assert_eq!(layout.total_pages, 2);
    assert_eq!(session.page_view(1).cells.len(), 1);
}

//! The shared pad store
//!
//! Failures never escape: `save` answers `false`, `load` answers `None`, and a
//! failing subscription hands `None` to its callback and keeps listening.

use crate::backend::DocumentBackend;
use crate::subscription::Subscription;
use futures_util::StreamExt;
use samspeak_core::{PadMapping, SharedDocument};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Receives every observed state of the pad mapping; `None` when the document
/// is missing or the subscription hit an error.
pub type PadCallback = Arc<dyn Fn(Option<PadMapping>) + Send + Sync>;

#[derive(Clone)]
pub struct SharedPadStore {
    backend: Arc<dyn DocumentBackend>,
}

impl SharedPadStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    /// Overwrite the whole mapping and stamp the document.
    pub async fn save(&self, mapping: &PadMapping) -> bool {
        let document = SharedDocument::stamp(mapping.clone());
        match self.backend.write(&document).await {
            Ok(()) => {
                info!("Saved {} pads to {} store", mapping.len(), self.backend.name());
                true
            }
            Err(e) => {
                error!("Error saving to {} store: {}", self.backend.name(), e);
                false
            }
        }
    }

    pub async fn load(&self) -> Option<PadMapping> {
        match self.backend.read().await {
            Ok(Some(document)) => {
                info!("Loaded {} pads from {} store", document.rectangles.len(), self.backend.name());
                Some(document.rectangles)
            }
            Ok(None) => {
                debug!("Shared document does not exist yet");
                None
            }
            Err(e) => {
                error!("Error loading from {} store: {}", self.backend.name(), e);
                None
            }
        }
    }

    /// Deliver every observed state to `callback` until the returned handle is
    /// dropped. Own writes are delivered too; nothing is deduplicated.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<PadMapping>) + Send + Sync + 'static,
    {
        self.subscribe_arc(Arc::new(callback))
    }

    pub fn subscribe_arc(&self, callback: PadCallback) -> Subscription {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("Error setting up store listener: {}", e);
                return Subscription::noop();
            }
        };

        let mut updates = self.backend.watch();
        let store_name = self.backend.name().to_string();

        let task = runtime.spawn(async move {
            while let Some(event) = updates.next().await {
                match event {
                    Ok(Some(document)) => {
                        debug!("Store update received from {}", store_name);
                        callback(Some(document.rectangles));
                    }
                    Ok(None) => callback(None),
                    Err(e) => {
                        error!("Error listening to {} store: {}", store_name, e);
                        callback(None);
                    }
                }
            }
            debug!("{} store watch ended", store_name);
        });

        Subscription::new(move || task.abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryBackend;
    use crate::backend::WatchStream;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct BrokenBackend;

    #[async_trait]
    impl DocumentBackend for BrokenBackend {
        async fn read(&self) -> Result<Option<SharedDocument>, StoreError> {
            Err(StoreError::Transport("offline".to_string()))
        }

        async fn write(&self, _document: &SharedDocument) -> Result<(), StoreError> {
            Err(StoreError::Transport("offline".to_string()))
        }

        fn watch(&self) -> WatchStream {
            futures_util::stream::iter(vec![
                Err(StoreError::Transport("offline".to_string())),
                Ok(Some(SharedDocument::stamp(PadMapping::new()))),
            ])
            .boxed()
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_failures_degrade() {
        let store = SharedPadStore::new(Arc::new(BrokenBackend));
        assert!(!store.save(&PadMapping::new()).await);
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_subscription_reports_none_and_keeps_listening() {
        let store = SharedPadStore::new(Arc::new(BrokenBackend));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = store.subscribe(move |pads| sink.lock().push(pads));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*seen.lock(), vec![None, Some(PadMapping::new())]);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
        let mut pads = PadMapping::new();
        pads.set_text(0, "More");
        pads.set_text(3, "Stop");

        assert!(store.save(&pads).await);
        assert_eq!(store.load().await, Some(pads));
    }

    #[test]
    fn test_subscribe_outside_runtime_is_noop() {
        let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
        let sub = store.subscribe(|_| {});
        assert!(format!("{:?}", sub).contains("false"));
    }
}

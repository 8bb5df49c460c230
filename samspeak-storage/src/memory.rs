//! In-process document backend

use crate::backend::{DocumentBackend, WatchStream};
use crate::error::StoreError;
use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::RwLock;
use samspeak_core::SharedDocument;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

const CHANNEL_CAPACITY: usize = 256;

/// Keeps the document in memory and fans writes out to watchers.
///
/// Also used by the server to host the document for remote clients.
pub struct MemoryBackend {
    document: Arc<RwLock<Option<SharedDocument>>>,
    changes: broadcast::Sender<Option<SharedDocument>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            document: Arc::new(RwLock::new(None)),
            changes,
        }
    }

    /// Start from an existing document.
    pub fn with_document(document: SharedDocument) -> Self {
        let backend = Self::new();
        *backend.document.write() = Some(document);
        backend
    }

    pub fn watcher_count(&self) -> usize {
        self.changes.receiver_count()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn read(&self) -> Result<Option<SharedDocument>, StoreError> {
        Ok(self.document.read().clone())
    }

    async fn write(&self, document: &SharedDocument) -> Result<(), StoreError> {
        *self.document.write() = Some(document.clone());
        // No receivers is fine: nobody is watching yet.
        let _ = self.changes.send(Some(document.clone()));
        Ok(())
    }

    fn watch(&self) -> WatchStream {
        // Subscribe before snapshotting so no write falls between the two.
        let receiver = self.changes.subscribe();
        let current = self.document.read().clone();
        let document = self.document.clone();

        let updates = BroadcastStream::new(receiver).map(move |item| match item {
            Ok(doc) => Ok(doc),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                // Missed intermediate writes; the latest state is what matters.
                warn!("Document watcher lagged by {} updates, resyncing", skipped);
                Ok(document.read().clone())
            }
        });

        futures_util::stream::once(async move { Ok(current) })
            .chain(updates)
            .boxed()
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samspeak_core::PadMapping;

    #[tokio::test]
    async fn test_read_missing_document() {
        let backend = MemoryBackend::new();
        assert!(backend.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_watch_sees_snapshot_then_writes() {
        let backend = MemoryBackend::new();
        let mut watch = backend.watch();

        assert_eq!(watch.next().await.unwrap().unwrap(), None);

        let mut pads = PadMapping::new();
        pads.set_text(0, "Hi");
        let doc = SharedDocument::stamp(pads);
        backend.write(&doc).await.unwrap();

        assert_eq!(watch.next().await.unwrap().unwrap(), Some(doc));
    }
}

//! JSON-file document backend

use crate::backend::{DocumentBackend, WatchStream};
use crate::error::StoreError;
use async_trait::async_trait;
use futures_util::StreamExt;
use samspeak_core::SharedDocument;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 256;

/// Stores the document as one JSON file. Writes go to a sibling temp file and
/// are renamed into place, so readers never see a torn document.
///
/// Watchers are notified of writes made through this backend instance only.
pub struct FileBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<Option<SharedDocument>>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            changes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "document.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

async fn read_document(path: &Path) -> Result<Option<SharedDocument>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl DocumentBackend for FileBackend {
    async fn read(&self) -> Result<Option<SharedDocument>, StoreError> {
        read_document(&self.path).await
    }

    async fn write(&self, document: &SharedDocument) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(document)?;

        {
            let _guard = self.write_lock.lock().await;
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            let temp = self.temp_path();
            tokio::fs::write(&temp, &json).await?;
            tokio::fs::rename(&temp, &self.path).await?;
        }

        debug!("Wrote shared document to {}", self.path.display());
        let _ = self.changes.send(Some(document.clone()));
        Ok(())
    }

    fn watch(&self) -> WatchStream {
        let receiver = self.changes.subscribe();
        let path = self.path.clone();
        let resync_path = path.clone();

        let updates = BroadcastStream::new(receiver).then(move |item| {
            let path = resync_path.clone();
            async move {
                match item {
                    Ok(doc) => Ok(doc),
                    Err(_) => {
                        warn!("File watcher lagged, re-reading {}", path.display());
                        read_document(&path).await
                    }
                }
            }
        });

        futures_util::stream::once(async move { read_document(&path).await })
            .chain(updates)
            .boxed()
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samspeak_core::PadMapping;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("pads.json"));

        assert!(backend.read().await.unwrap().is_none());

        let mut pads = PadMapping::new();
        pads.set_text(2, "Juice");
        let doc = SharedDocument::stamp(pads);
        backend.write(&doc).await.unwrap();

        assert_eq!(backend.read().await.unwrap(), Some(doc));
        assert!(!backend.temp_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pads.json");
        std::fs::write(&path, "{not json").unwrap();

        let backend = FileBackend::new(path);
        assert!(matches!(backend.read().await, Err(StoreError::Serialization(_))));
    }
}

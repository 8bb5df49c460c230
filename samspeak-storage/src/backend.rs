//! Backend trait for the shared document

use crate::error::StoreError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use samspeak_core::SharedDocument;

/// One observation of the shared document: its current contents, `None` when
/// the document does not exist, or a failure of the watch itself.
pub type WatchEvent = Result<Option<SharedDocument>, StoreError>;

/// Stream of observations. The first item is the current state; every later
/// item follows a write, including writes made by this process.
pub type WatchStream = BoxStream<'static, WatchEvent>;

/// Storage for the single shared document.
///
/// Backends are fallible; the failure policy (log and degrade) lives in
/// [`crate::store::SharedPadStore`].
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Read the document. `Ok(None)` means it has never been written.
    async fn read(&self) -> Result<Option<SharedDocument>, StoreError>;

    /// Replace the whole document.
    async fn write(&self, document: &SharedDocument) -> Result<(), StoreError>;

    /// Observe the document. Must be called from within a tokio runtime.
    fn watch(&self) -> WatchStream;

    /// Backend name for logs
    fn name(&self) -> &str;
}

//! samspeak-storage: the shared pad document and its local mirrors
//!
//! - [`backend::DocumentBackend`]: fallible read/write/watch of the shared document
//! - [`store::SharedPadStore`]: the pad store contract (`save`/`load`/`subscribe`)
//!   with failures reported as `false`/`None` instead of errors
//! - [`local_cache::LocalCache`]: per-index mirror used until the first remote load
//! - [`session::PadSession`]: a controller or editor view over the store
//! - [`offline::AssetCache`]: network-first asset cache for offline use

pub mod error;
pub mod subscription;
pub mod backend;
pub mod memory;
pub mod file;
pub mod http;
pub mod store;
pub mod local_cache;
pub mod session;
pub mod offline;

pub use error::StoreError;
pub use subscription::Subscription;
pub use backend::{DocumentBackend, WatchEvent, WatchStream};
pub use memory::MemoryBackend;
pub use file::FileBackend;
pub use http::HttpBackend;
pub use store::{PadCallback, SharedPadStore};
pub use local_cache::LocalCache;
pub use session::{PadSession, SessionRole, StatusMessage};
pub use offline::{AssetCache, AssetResponse};

use samspeak_core::config::{StoreBackend, StoreConfig};
use std::sync::Arc;

/// Build the backend named by the configuration.
pub fn backend_from_config(config: &StoreConfig) -> Result<Arc<dyn DocumentBackend>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryBackend::new())),
        StoreBackend::File => {
            let path = config
                .path
                .clone()
                .ok_or_else(|| StoreError::Config("store.path is required".to_string()))?;
            Ok(Arc::new(FileBackend::new(path)))
        }
        StoreBackend::Http => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| StoreError::Config("store.url is required".to_string()))?;
            Ok(Arc::new(HttpBackend::new(
                url,
                config.timeout_secs,
                config.reconnect_delay_ms,
            )?))
        }
    }
}

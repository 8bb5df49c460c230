//! Per-index local mirror of pad texts
//!
//! One key per pad, `rectangle-{index}`. It is only read on first load when the
//! shared document cannot be fetched, so entries are overwritten but never
//! pruned when a pad is deleted remotely.

use crate::error::StoreError;
use samspeak_core::{PadMapping, PADS_PER_PAGE};
use std::path::Path;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "rectangle-";

pub struct LocalCache {
    db: sled::Db,
}

impl LocalCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        Ok(Self { db })
    }

    /// Throwaway cache, removed when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn key(index: usize) -> String {
        format!("{}{}", KEY_PREFIX, index)
    }

    pub fn get(&self, index: usize) -> Result<Option<String>, StoreError> {
        match self.db.get(Self::key(index))? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }

    pub fn set(&self, index: usize, text: &str) -> Result<(), StoreError> {
        self.db.insert(Self::key(index), text.as_bytes())?;
        Ok(())
    }

    /// Write every entry of `pads` into the cache.
    pub fn mirror(&self, pads: &PadMapping) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        for (index, text) in pads.iter() {
            batch.insert(Self::key(index).as_bytes(), text.as_bytes());
        }
        self.db.apply_batch(batch)?;
        debug!("Mirrored {} pads into local cache", pads.len());
        Ok(())
    }

    /// First page of cached pads, skipping empty and missing entries.
    pub fn controller_fallback(&self) -> PadMapping {
        (0..PADS_PER_PAGE)
            .filter_map(|index| match self.get(index) {
                Ok(Some(text)) if !text.is_empty() => Some((index, text)),
                Ok(_) => None,
                Err(e) => {
                    warn!("Local cache read failed for pad {}: {}", index, e);
                    None
                }
            })
            .collect()
    }

    /// Six editable slots, empty where nothing is cached.
    pub fn editor_fallback(&self) -> PadMapping {
        (0..PADS_PER_PAGE)
            .map(|index| {
                let text = self.get(index).unwrap_or_else(|e| {
                    warn!("Local cache read failed for pad {}: {}", index, e);
                    None
                });
                (index, text.unwrap_or_default())
            })
            .collect()
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.db.flush_async().await?;
        Ok(())
    }
}

//! Offline asset cache
//!
//! Versioned like a service worker cache: `install` precaches the asset list
//! into the tree named after the cache version, `activate` drops every other
//! version, and `fetch` goes to the network first, answering from the cache
//! only when the network cannot be reached. Successful network responses are
//! not written back.

use crate::error::StoreError;
use bytes::Bytes;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Body and status served for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub body: Bytes,
    pub from_cache: bool,
}

pub struct AssetCache {
    db: sled::Db,
    tree: sled::Tree,
    version: String,
    origin: Url,
    client: Client,
}

impl AssetCache {
    pub fn open(path: impl AsRef<Path>, version: &str, origin: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        Self::with_db(db, version, origin, timeout_secs)
    }

    pub fn temporary(version: &str, origin: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_db(db, version, origin, timeout_secs)
    }

    fn with_db(db: sled::Db, version: &str, origin: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        if version.is_empty() {
            return Err(StoreError::Config("Cache version cannot be empty".to_string()));
        }
        let origin = Url::parse(origin)
            .map_err(|e| StoreError::Config(format!("Invalid origin '{}': {}", origin, e)))?;
        let tree = db.open_tree(version)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            db,
            tree,
            version: version.to_string(),
            origin,
            client,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn url_for(&self, path: &str) -> Result<Url, StoreError> {
        self.origin
            .join(path)
            .map_err(|e| StoreError::Config(format!("Invalid asset path '{}': {}", path, e)))
    }

    /// Fetch and store every asset. Fails as a whole if any asset cannot be
    /// fetched successfully, leaving earlier assets in place.
    pub async fn install(&self, assets: &[String]) -> Result<usize, StoreError> {
        for path in assets {
            let response = self.client.get(self.url_for(path)?).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(StoreError::Remote {
                    status: status.as_u16(),
                    message: format!("Failed to precache {}", path),
                });
            }
            let body = response.bytes().await?;
            self.tree.insert(path.as_bytes(), body.as_ref())?;
            debug!("Precached {} ({} bytes)", path, body.len());
        }
        self.tree.flush_async().await?;
        info!("Installed {} assets into cache {}", assets.len(), self.version);
        Ok(assets.len())
    }

    /// Drop every cache version except the current one. Returns the names
    /// of the dropped versions.
    pub fn activate(&self) -> Result<Vec<String>, StoreError> {
        let default_tree = self.db.name();
        let mut dropped = Vec::new();

        for name in self.db.tree_names() {
            if name == default_tree || name.as_ref() == self.version.as_bytes() {
                continue;
            }
            self.db.drop_tree(&name)?;
            dropped.push(String::from_utf8_lossy(&name).into_owned());
        }

        if !dropped.is_empty() {
            info!("Dropped stale asset caches: {:?}", dropped);
        }
        Ok(dropped)
    }

    /// Network first, cache on transport failure. `None` when both miss.
    pub async fn fetch(&self, path: &str) -> Result<Option<AssetResponse>, StoreError> {
        let url = self.url_for(path)?;
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.bytes().await?;
                Ok(Some(AssetResponse {
                    status,
                    body,
                    from_cache: false,
                }))
            }
            Err(e) => {
                warn!("Network fetch of {} failed, trying cache: {}", path, e.without_url());
                Ok(self.cached(path)?.map(|body| AssetResponse {
                    status: 200,
                    body,
                    from_cache: true,
                }))
            }
        }
    }

    pub fn cached(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self
            .tree
            .get(path.as_bytes())?
            .map(|bytes| Bytes::copy_from_slice(&bytes)))
    }

    pub fn put(&self, path: &str, body: &[u8]) -> Result<(), StoreError> {
        self.tree.insert(path.as_bytes(), body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_falls_back_to_cache_when_unreachable() {
        let cache = AssetCache::temporary("sam-speak-v1", "http://127.0.0.1:1", 1).unwrap();
        cache.put("/manifest.json", b"{}").unwrap();

        let response = cache.fetch("/manifest.json").await.unwrap().unwrap();
        assert!(response.from_cache);
        assert_eq!(response.body.as_ref(), b"{}");

        assert!(cache.fetch("/missing.js").await.unwrap().is_none());
    }

    #[test]
    fn test_activate_drops_other_versions() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        db.open_tree("sam-speak-v0").unwrap().insert("/", "old").unwrap();

        let cache = AssetCache::with_db(db, "sam-speak-v1", "http://localhost", 1).unwrap();
        cache.put("/", b"new").unwrap();

        assert_eq!(cache.activate().unwrap(), vec!["sam-speak-v0".to_string()]);
        assert_eq!(cache.cached("/").unwrap().unwrap().as_ref(), b"new");
        assert!(cache.activate().unwrap().is_empty());
    }

    #[test]
    fn test_empty_version_rejected() {
        assert!(AssetCache::temporary("", "http://localhost", 1).is_err());
    }
}

//! Session-scoped metadata cache.
//!
//! One slot per key, filled at most once. There is no TTL and no refresh;
//! a reconfigured session gets a fresh cache instead.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::entry::FileEntry;
use crate::error::Result;

/// Key under which the full flat entry set is stored.
pub const FILES_KEY: &str = "files";

/// Shared, immutable listing handed out on every hit.
pub type Listing = Arc<Vec<FileEntry>>;

#[derive(Debug, Default)]
pub struct MetadataCache {
    slots: Mutex<HashMap<String, Listing>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `fill` and store its result.
    ///
    /// The lock is held across `fill`, so concurrent misses on one key
    /// fetch once. Errors are returned and nothing is stored.
    pub async fn get_or_try_insert_with<F, Fut>(&self, key: &str, fill: F) -> Result<Listing>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<FileEntry>>>,
    {
        let mut slots = self.slots.lock().await;
        if let Some(hit) = slots.get(key) {
            debug!("cache hit for '{}'", key);
            return Ok(Arc::clone(hit));
        }
        let value: Listing = Arc::new(fill().await?);
        info!("cached '{}' ({} entries)", key, value.len());
        slots.insert(key.to_string(), Arc::clone(&value));
        Ok(value)
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::EndorsementLayout;

/// Layout refresh interval when none is configured
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// Immutable snapshot of the layouts discovered for one chaincode
#[derive(Debug)]
pub struct CachedLayouts {
    pub layouts: Vec<EndorsementLayout>,
    pub fetched_at: Instant,
}

impl CachedLayouts {
    pub fn is_stale(&self, refresh_interval: Duration) -> bool {
        self.fetched_at.elapsed() >= refresh_interval
    }
}

/// Discovery results shared by every executor that holds the same `Arc`.
///
/// Entries are never mutated: a refresh inserts a new snapshot, and readers
/// keep whichever snapshot they cloned.
#[derive(Debug)]
pub struct DiscoveryCache {
    entries: RwLock<HashMap<String, Arc<CachedLayouts>>>,
    refresh_interval: Duration,
}

impl DiscoveryCache {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            refresh_interval,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Fresh snapshot for `key`, if any
    pub async fn get(&self, key: &str) -> Option<Arc<CachedLayouts>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|cached| !cached.is_stale(self.refresh_interval))
            .cloned()
    }

    /// Swap in a new snapshot for `key` and return it
    pub async fn store(&self, key: &str, layouts: Vec<EndorsementLayout>) -> Arc<CachedLayouts> {
        let snapshot = Arc::new(CachedLayouts {
            layouts,
            fetched_at: Instant::now(),
        });
        self.entries
            .write()
            .await
            .insert(key.to_string(), snapshot.clone());
        snapshot
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for DiscoveryCache {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

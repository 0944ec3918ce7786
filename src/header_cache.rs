//! Validated-header cache (spec §5): content-addressed blocks never change once
//! written, so a decoded and signature-checked `ConstituentBlockList` can be cached
//! for the life of the process with no TTL or invalidation path — only eviction
//! under size pressure.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;

use crate::block::cbl::ConstituentBlockList;
use crate::checksum::Checksum;

/// Cache of decoded, signature-verified CBLs keyed by their prime checksum.
pub struct HeaderCache {
    entries: RwLock<LruCache<Checksum, Arc<ConstituentBlockList>>>,
}

impl HeaderCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_capacity(capacity)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        HeaderCache {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Look up a previously verified CBL by its prime checksum.
    pub async fn get(&self, checksum: &Checksum) -> Option<Arc<ConstituentBlockList>> {
        let mut cache = self.entries.write().await;
        cache.get(checksum).cloned()
    }

    /// Record a verified CBL under its prime checksum, evicting the least
    /// recently used entry if the cache is full.
    pub async fn put(&self, checksum: Checksum, cbl: Arc<ConstituentBlockList>) {
        let mut cache = self.entries.write().await;
        cache.put(checksum, cbl);
    }

    /// Drop a cached entry, e.g. if a later re-read of the same checksum disagrees
    /// with what was cached (should never happen for content-addressed data, but
    /// callers shouldn't have to trust the cache blindly).
    pub async fn invalidate(&self, checksum: &Checksum) {
        self.entries.write().await.pop(checksum);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::cbl::ExtendedMetadata;
    use chrono::Utc;

    fn sample_cbl() -> ConstituentBlockList {
        let _ = ExtendedMetadata {
            file_name: "unused".into(),
            mime_type: "unused".into(),
        };
        ConstituentBlockList {
            block_size: crate::block_size::BlockSize::Tiny,
            creator_id: [9; 16],
            date_created: Utc::now(),
            original_data_length: 10,
            tuple_size: 3,
            extended: None,
            creator_signature: [0u8; 65],
            addresses: vec![Checksum::of(b"a")],
            encoded: vec![0u8; crate::block_size::BlockSize::Tiny.bytes()],
        }
    }

    #[tokio::test]
    async fn miss_then_hit_after_put() {
        let cache = HeaderCache::new(4);
        let checksum = Checksum::of(b"root");
        assert!(cache.get(&checksum).await.is_none());

        cache.put(checksum, Arc::new(sample_cbl())).await;
        assert!(cache.get(&checksum).await.is_some());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = HeaderCache::new(4);
        let checksum = Checksum::of(b"root");
        cache.put(checksum, Arc::new(sample_cbl())).await;
        cache.invalidate(&checksum).await;
        assert!(cache.get(&checksum).await.is_none());
    }

    #[tokio::test]
    async fn evicts_least_recently_used_when_full() {
        let cache = HeaderCache::new(2);
        let a = Checksum::of(b"a");
        let b = Checksum::of(b"b");
        let c = Checksum::of(b"c");

        cache.put(a, Arc::new(sample_cbl())).await;
        cache.put(b, Arc::new(sample_cbl())).await;
        cache.put(c, Arc::new(sample_cbl())).await;
        // `a` is now the least recently used and should be evicted.
        assert_eq!(cache.len().await, 2);
    }
}

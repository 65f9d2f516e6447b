use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use skyblob_types::{Blob, BlobMeta, ContentId};

use crate::error::StoreResult;
use crate::traits::{BlobStore, CacheLookup};

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Entries are kept as the same
/// (metadata, payload) pair the filesystem store persists, so a seeded
/// inconsistent entry is reported as corrupt exactly as on disk.
pub struct InMemoryBlobStore {
    entries: RwLock<HashMap<ContentId, (BlobMeta, Bytes)>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Insert a raw (metadata, payload) pair without any consistency check.
    pub fn insert_entry(&self, id: ContentId, meta: BlobMeta, data: impl Into<Bytes>) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(id, (meta, data.into()));
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, id: &ContentId) -> StoreResult<CacheLookup> {
        let map = self.entries.read().expect("lock poisoned");
        let Some((meta, data)) = map.get(id) else {
            return Ok(CacheLookup::Absent);
        };
        Ok(match Blob::from_parts(*id, meta.clone(), data.clone()) {
            Ok(blob) => CacheLookup::Hit(blob),
            Err(e) => CacheLookup::Corrupt {
                reason: e.to_string(),
            },
        })
    }

    async fn put(&self, blob: &Blob) -> StoreResult<()> {
        self.insert_entry(*blob.id(), blob.meta(), blob.data().clone());
        Ok(())
    }

    async fn remove(&self, id: &ContentId) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<ContentId>> {
        let map = self.entries.read().expect("lock poisoned");
        let mut ids: Vec<ContentId> = map.keys().copied().collect();
        ids.sort_by_key(|id| id.to_string());
        Ok(ids)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("entry_count", &self.len())
            .finish()
    }
}

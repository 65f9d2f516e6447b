use async_trait::async_trait;
use skyblob_types::{Blob, ContentId};

use crate::error::StoreResult;

/// Outcome of a cache lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheLookup {
    /// Both artifacts present and length-consistent.
    Hit(Blob),
    /// No metadata record for the identifier.
    Absent,
    /// A metadata record exists but the entry is unusable (missing payload,
    /// unreadable metadata, or a payload whose length disagrees with it).
    Corrupt { reason: String },
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// The cached blob, treating `Corrupt` the same as `Absent`.
    pub fn into_hit(self) -> Option<Blob> {
        match self {
            Self::Hit(blob) => Some(blob),
            Self::Absent | Self::Corrupt { .. } => None,
        }
    }
}

/// Content-addressed blob cache.
///
/// All implementations must satisfy these invariants:
/// - Entries are keyed by the identifier's canonical string.
/// - `get` never returns a hit whose payload length differs from its
///   recorded size.
/// - `put` of the same identifier is idempotent: verified payloads for one
///   key are byte-identical, so concurrent writers cannot disagree.
/// - A `put` interrupted at any point leaves no entry visible as a hit.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Look up an entry by identifier.
    ///
    /// Returns `Err` only for I/O failures other than "not found".
    async fn get(&self, id: &ContentId) -> StoreResult<CacheLookup>;

    /// Persist a blob's metadata and payload under its identifier.
    async fn put(&self, blob: &Blob) -> StoreResult<()>;

    /// Remove an entry. Returns `true` if a metadata record existed.
    async fn remove(&self, id: &ContentId) -> StoreResult<bool>;

    /// Identifiers of every entry with a metadata record, sorted by their
    /// canonical string.
    async fn list(&self) -> StoreResult<Vec<ContentId>>;

    /// Check whether a usable entry exists.
    async fn contains(&self, id: &ContentId) -> StoreResult<bool> {
        Ok(self.get(id).await?.is_hit())
    }
}

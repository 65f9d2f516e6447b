//! Content-addressed blob cache for skyblob.
//!
//! Blobs are stored under their canonical content identifier. Each cache
//! entry is a pair of artifacts: a metadata record and the raw payload.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`FsBlobStore`] -- directory-backed durable store (`{root}/blobs/`)
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. An entry is a hit only if both artifacts exist and agree on length.
//! 2. Anything less is reported as [`CacheLookup::Corrupt`], never as a hit.
//! 3. The payload is published before the metadata, each by atomic rename,
//!    so an interrupted write is never observable as a hit.
//! 4. The store never verifies hashes; callers put only verified blobs.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::{BlobStore, CacheLookup};

//! Foundation types for skyblob.
//!
//! Every other skyblob crate depends on `skyblob-types`.
//!
//! # Key Types
//!
//! - [`ContentId`] -- canonical, self-describing content identifier (CID)
//! - [`HashFunction`] -- the multihash functions a [`ContentId`] may declare
//! - [`Blob`] -- a resolved blob: identifier, bytes, content type, provenance
//! - [`BlobMeta`] -- the metadata record persisted next to a cached payload
//! - [`Provenance`] -- which host served a blob, for which owner, from which URL

pub mod blob;
pub mod content_id;
pub mod error;

pub use blob::{Blob, BlobMeta, Provenance};
pub use content_id::{ContentId, HashFunction, DAG_CBOR_CODEC, DAG_PB_CODEC, RAW_CODEC};
pub use error::{IdentifierError, TypeError};

/// Re-exported so callers can name CID versions without a direct `cid` dependency.
pub use cid::Version as CidVersion;

//! Content hashing for skyblob.
//!
//! Computes digests under the hash function a [`ContentId`] declares and
//! compares the result against the identifier. All digests come from
//! established libraries (`sha2`, `blake3`).
//!
//! [`ContentId`]: skyblob_types::ContentId

pub mod hasher;

pub use hasher::BlobHasher;

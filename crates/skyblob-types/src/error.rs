use thiserror::Error;

use crate::content_id::HashFunction;

/// Errors produced while decoding or building a content identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("malformed content identifier: {0}")]
    Malformed(String),

    #[error("unsupported hash function: {0:#x}")]
    UnsupportedHash(u64),

    #[error("unknown hash function name: {0}")]
    UnknownHashName(String),

    #[error("digest length mismatch for {function}: expected {expected} bytes, got {actual}")]
    DigestLength {
        function: HashFunction,
        expected: usize,
        actual: usize,
    },

    /// The text decoded, but does not re-encode to the same string.
    #[error("content identifier is not canonical: {given} re-encodes as {canonical}")]
    NonCanonical { given: String, canonical: String },
}

/// Errors produced by blob type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("size mismatch: metadata records {recorded} bytes, payload has {actual}")]
    SizeMismatch { recorded: u64, actual: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::content_id::ContentId;
use crate::error::TypeError;

/// Where a blob was fetched from.
///
/// Serialized with the field names used by existing cache metadata files
/// (`pds`, `did`, `url`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// The host (PDS) that served the bytes.
    #[serde(rename = "pds")]
    pub host: String,
    /// The canonical owner the request was made for.
    #[serde(rename = "did")]
    pub owner: String,
    /// The full fetch URL.
    pub url: String,
}

/// Metadata record persisted alongside a cached payload.
///
/// Everything a [`Blob`] carries except its bytes and its identifier (the
/// identifier is the storage key).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMeta {
    pub size: u64,
    #[serde(default)]
    pub content_type: String,
    #[serde(rename = "source", default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl BlobMeta {
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec_pretty(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn from_json(data: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(data).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

/// A resolved blob.
///
/// `size` is never stored independently: it is always the length of `data`,
/// so the size-equals-length invariant holds for every constructed value.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    id: ContentId,
    content_type: String,
    data: Bytes,
    provenance: Option<Provenance>,
}

impl Blob {
    pub fn new(
        id: ContentId,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
        provenance: Option<Provenance>,
    ) -> Self {
        Self {
            id,
            content_type: content_type.into(),
            data: data.into(),
            provenance,
        }
    }

    /// Rebuild a blob from a metadata record and its payload.
    ///
    /// Fails if the payload length disagrees with the recorded size.
    pub fn from_parts(id: ContentId, meta: BlobMeta, data: Bytes) -> Result<Self, TypeError> {
        let actual = data.len() as u64;
        if actual != meta.size {
            return Err(TypeError::SizeMismatch {
                recorded: meta.size,
                actual,
            });
        }
        Ok(Self {
            id,
            content_type: meta.content_type,
            data,
            provenance: meta.provenance,
        })
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// The metadata record for this blob.
    pub fn meta(&self) -> BlobMeta {
        BlobMeta {
            size: self.size(),
            content_type: self.content_type.clone(),
            provenance: self.provenance.clone(),
        }
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("id", &self.id)
            .field("size", &self.size())
            .field("content_type", &self.content_type)
            .field("provenance", &self.provenance)
            .finish()
    }
}

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use skyblob_types::{Blob, BlobMeta, ContentId};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::{BlobStore, CacheLookup};

/// Directory under the cache root that holds every entry.
pub const BLOBS_DIR: &str = "blobs";
/// Extension of the metadata artifact.
pub const META_EXT: &str = "json";
/// Extension of the payload artifact.
pub const PAYLOAD_EXT: &str = "blob";

/// Directory-backed blob cache.
///
/// On-disk layout:
/// ```text
/// {root}/blobs/{cid}.json   metadata (size, content type, provenance)
/// {root}/blobs/{cid}.blob   raw payload bytes
/// ```
///
/// Writes go through a temporary file in the same directory followed by an
/// atomic rename, payload first. Readers therefore see either no metadata,
/// or metadata whose payload has already been fully published.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`. Nothing is touched on disk until the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.root.join(BLOBS_DIR)
    }

    pub fn meta_path(&self, id: &ContentId) -> PathBuf {
        self.blobs_dir().join(format!("{id}.{META_EXT}"))
    }

    pub fn payload_path(&self, id: &ContentId) -> PathBuf {
        self.blobs_dir().join(format!("{id}.{PAYLOAD_EXT}"))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, id: &ContentId) -> StoreResult<CacheLookup> {
        let meta_bytes = match tokio::fs::read(self.meta_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CacheLookup::Absent),
            Err(e) => return Err(e.into()),
        };
        let meta = match BlobMeta::from_json(&meta_bytes) {
            Ok(meta) => meta,
            Err(e) => return Ok(corrupt(id, format!("unreadable metadata: {e}"))),
        };
        let data = match tokio::fs::read(self.payload_path(id)).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(corrupt(id, "payload missing".to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        match Blob::from_parts(*id, meta, Bytes::from(data)) {
            Ok(blob) => {
                debug!(cid = %id, size = blob.size(), "cache entry loaded");
                Ok(CacheLookup::Hit(blob))
            }
            Err(e) => Ok(corrupt(id, e.to_string())),
        }
    }

    async fn put(&self, blob: &Blob) -> StoreResult<()> {
        let meta = blob
            .meta()
            .to_json_pretty()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let dir = self.blobs_dir();
        let key = blob.id().to_string();
        let data = blob.data().clone();

        // The blocking task runs to completion even if this future is
        // dropped, so an entry is either fully published or not at all.
        tokio::task::spawn_blocking(move || write_entry(&dir, &key, &data, &meta))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        debug!(cid = %blob.id(), size = blob.size(), "cache entry written");
        Ok(())
    }

    async fn remove(&self, id: &ContentId) -> StoreResult<bool> {
        // Metadata first, so a half-removed entry is a miss rather than a hit.
        let existed = remove_if_present(&self.meta_path(id)).await?;
        remove_if_present(&self.payload_path(id)).await?;
        Ok(existed)
    }

    async fn list(&self) -> StoreResult<Vec<ContentId>> {
        let mut entries = match tokio::fs::read_dir(self.blobs_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e != META_EXT).unwrap_or(true) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match ContentId::parse(stem) {
                Ok(id) => ids.push(id),
                Err(e) => debug!(path = %path.display(), error = %e, "skipping foreign file"),
            }
        }
        ids.sort_by_key(|id| id.to_string());
        Ok(ids)
    }
}

fn corrupt(id: &ContentId, reason: String) -> CacheLookup {
    warn!(cid = %id, %reason, "corrupt cache entry");
    CacheLookup::Corrupt { reason }
}

async fn remove_if_present(path: &Path) -> StoreResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn write_entry(dir: &Path, key: &str, data: &[u8], meta: &[u8]) -> StoreResult<()> {
    create_blobs_dir(dir)?;
    publish(dir, &format!("{key}.{PAYLOAD_EXT}"), data)?;
    publish(dir, &format!("{key}.{META_EXT}"), meta)?;
    Ok(())
}

/// Write `contents` to a temp file in `dir` and rename it over `name`.
fn publish(dir: &Path, name: &str, contents: &[u8]) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dir.join(name)).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn create_blobs_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_blobs_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

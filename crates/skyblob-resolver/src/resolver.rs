use std::path::PathBuf;
use std::sync::Arc;

use skyblob_crypto::BlobHasher;
use skyblob_net::{
    build_http_client, DirectoryResolver, HostFetcher, HttpDirectory, HttpHostFetcher,
};
use skyblob_store::{BlobStore, CacheLookup, FsBlobStore};
use skyblob_types::{Blob, ContentId, Provenance};
use tracing::{debug, info, warn};

use crate::cancel::{Cancellation, Step};
use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};

/// Resolves `(owner, cid)` pairs into verified blobs.
///
/// Holds no per-call state; share it behind an `Arc`.
pub struct BlobResolver {
    store: Arc<dyn BlobStore>,
    directory: Arc<dyn DirectoryResolver>,
    fetcher: Arc<dyn HostFetcher>,
}

impl BlobResolver {
    pub fn new(
        store: Arc<dyn BlobStore>,
        directory: Arc<dyn DirectoryResolver>,
        fetcher: Arc<dyn HostFetcher>,
    ) -> Self {
        Self {
            store,
            directory,
            fetcher,
        }
    }

    /// Filesystem cache at `config.cache_root` plus the HTTP directory and
    /// host clients, sharing one connection pool.
    pub fn from_config(config: &ResolverConfig) -> ResolveResult<Self> {
        let http = build_http_client(config.timeout(), &config.user_agent)?;
        let directory = HttpDirectory::new(http.clone(), config.directory_url()?);
        Ok(Self::new(
            Arc::new(FsBlobStore::new(config.cache_root.clone())),
            Arc::new(directory),
            Arc::new(HttpHostFetcher::new(http)),
        ))
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Resolve one blob.
    ///
    /// Returns the cached blob when a usable entry exists; otherwise looks
    /// up the owner's first host, fetches, verifies the bytes against `cid_text`
    /// and writes the verified blob through to the cache. A failed cache
    /// write does not fail the call.
    pub async fn resolve(
        &self,
        owner: &str,
        cid_text: &str,
        cancel: &Cancellation,
    ) -> ResolveResult<Blob> {
        let id = ContentId::parse(cid_text)?;

        if let Some(blob) = self.lookup_cache(&id, cancel).await? {
            return Ok(blob);
        }

        let record = cancel
            .run(Step::Directory, self.directory.resolve(owner))
            .await??;
        let host = record
            .primary_host()
            .ok_or_else(|| ResolveError::DirectoryNotFound {
                owner: owner.to_string(),
            })?
            .clone();

        let fetched = cancel
            .run(Step::Fetch, self.fetcher.fetch(&host, &record.owner, &id))
            .await??;

        let actual = BlobHasher::digest(&id, &fetched.data)?;
        if actual != id {
            warn!(
                expected = %id,
                actual = %actual,
                expected_digest = %BlobHasher::digest_hex(&id),
                actual_digest = %BlobHasher::digest_hex(&actual),
                url = %fetched.url,
                "fetched bytes do not match identifier"
            );
            return Err(ResolveError::HashMismatch {
                expected: id.to_string(),
                actual: actual.to_string(),
            });
        }

        info!(
            cid = %id,
            owner = %record.owner,
            %host,
            size = fetched.data.len(),
            "blob fetched and verified"
        );
        let provenance = Provenance {
            host: host.as_str().trim_end_matches('/').to_string(),
            owner: record.owner,
            url: fetched.url.to_string(),
        };
        let blob = Blob::new(id, fetched.content_type, fetched.data, Some(provenance));

        self.persist(&blob, cancel).await;
        Ok(blob)
    }

    /// Read errors and unusable entries are misses.
    async fn lookup_cache(
        &self,
        id: &ContentId,
        cancel: &Cancellation,
    ) -> ResolveResult<Option<Blob>> {
        match cancel.run(Step::CacheRead, self.store.get(id)).await? {
            Ok(CacheLookup::Hit(blob)) => {
                debug!(cid = %id, size = blob.size(), "cache hit");
                Ok(Some(blob))
            }
            Ok(CacheLookup::Absent) => {
                debug!(cid = %id, "cache miss");
                Ok(None)
            }
            Ok(CacheLookup::Corrupt { reason }) => {
                debug!(cid = %id, %reason, "cache entry unusable, refetching");
                Ok(None)
            }
            Err(e) => {
                warn!(cid = %id, error = %e, "cache read failed, refetching");
                Ok(None)
            }
        }
    }

    /// Best effort: the blob is already verified, so neither a failed nor
    /// an interrupted write is reported to the caller.
    async fn persist(&self, blob: &Blob, cancel: &Cancellation) {
        match cancel.run(Step::CacheWrite, self.store.put(blob)).await {
            Ok(Ok(())) => debug!(cid = %blob.id(), "blob cached"),
            Ok(Err(e)) => warn!(cid = %blob.id(), error = %e, "cache write failed"),
            Err(e) => warn!(cid = %blob.id(), error = %e, "cache write abandoned"),
        }
    }
}

impl std::fmt::Debug for BlobResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobResolver").finish_non_exhaustive()
    }
}

/// Resolve a blob with the filesystem cache under `cache_root` and the
/// default directory and HTTP settings.
pub async fn resolve_blob(
    cache_root: impl Into<PathBuf>,
    owner: &str,
    cid_text: &str,
) -> ResolveResult<Blob> {
    let config = ResolverConfig::default().with_cache_root(cache_root);
    BlobResolver::from_config(&config)?
        .resolve(owner, cid_text, &Cancellation::none())
        .await
}

//! Owner → host lookup against a directory service.
//!
//! The directory answers `GET {directory}/{owner}` with a JSON object:
//!
//! ```json
//! { "did": "did:plc:…", "pds": ["https://pds.example"] }
//! ```
//!
//! Only `did` and `pds` are read; any other fields are ignored.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::DirectoryError;

/// Directory queried when none is configured.
pub const DEFAULT_DIRECTORY_URL: &str = "https://api.atscan.net";

/// Resolved location of an owner's data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Canonical owner identifier (the DID, even if a handle was looked up).
    pub owner: String,
    /// Hosts currently serving the owner, in directory order.
    pub hosts: Vec<Url>,
}

impl DirectoryRecord {
    /// The host used for fetching. Later hosts are never consulted.
    pub fn primary_host(&self) -> Option<&Url> {
        self.hosts.first()
    }
}

/// Maps an owner reference to the hosts serving it.
#[async_trait]
pub trait DirectoryResolver: Send + Sync {
    async fn resolve(&self, owner: &str) -> Result<DirectoryRecord, DirectoryError>;
}

/// Wire schema of a directory answer.
///
/// Host entries stay untyped: only the first is ever fetched from, so it
/// alone must be usable.
#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    did: String,
    pds: Vec<Value>,
}

/// An `http`/`https` URL, if `entry` is a string holding one.
fn parse_host(entry: &Value) -> Result<Url, String> {
    let raw = entry
        .as_str()
        .ok_or_else(|| format!("host entry {entry} is not a string"))?;
    let url = Url::parse(raw).map_err(|e| format!("host {raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("host {raw:?} has scheme {other}")),
    }
}

impl DirectoryResponse {
    fn into_record(self, owner: &str) -> Result<DirectoryRecord, DirectoryError> {
        let malformed = |reason: String| DirectoryError::Malformed {
            owner: owner.to_string(),
            reason,
        };

        let Some((first, rest)) = self.pds.split_first() else {
            return Err(DirectoryError::NotFound {
                owner: owner.to_string(),
            });
        };
        if self.did.trim().is_empty() {
            return Err(malformed("empty did".into()));
        }

        let primary = parse_host(first).map_err(malformed)?;
        let mut hosts = vec![primary];
        for entry in rest {
            match parse_host(entry) {
                Ok(url) => hosts.push(url),
                Err(reason) => debug!(owner, %reason, "ignoring unusable secondary host"),
            }
        }

        Ok(DirectoryRecord {
            owner: self.did,
            hosts,
        })
    }
}

/// Directory client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpDirectory {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base_url}/{owner}`, with `owner` percent-encoded as one path segment.
    pub fn lookup_url(&self, owner: &str) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::Transport {
                endpoint: self.base_url.to_string(),
                reason: "directory URL cannot carry a path".into(),
            })?
            .pop_if_empty()
            .push(owner);
        Ok(url)
    }
}

#[async_trait]
impl DirectoryResolver for HttpDirectory {
    async fn resolve(&self, owner: &str) -> Result<DirectoryRecord, DirectoryError> {
        let url = self.lookup_url(owner)?;
        let endpoint = url.to_string();

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound {
                owner: owner.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DirectoryError::Status {
                owner: owner.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| DirectoryError::Transport {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        let parsed: DirectoryResponse =
            serde_json::from_slice(&body).map_err(|e| DirectoryError::Malformed {
                owner: owner.to_string(),
                reason: e.to_string(),
            })?;

        let record = parsed.into_record(owner)?;
        debug!(
            owner,
            did = %record.owner,
            hosts = record.hosts.len(),
            "directory lookup complete"
        );
        Ok(record)
    }
}

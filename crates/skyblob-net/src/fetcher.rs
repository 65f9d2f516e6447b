use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use skyblob_types::ContentId;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// XRPC method that serves a repository blob.
pub const GET_BLOB_NSID: &str = "com.atproto.sync.getBlob";

/// Bytes returned by a host, unverified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedBlob {
    pub data: Bytes,
    /// `Content-Type` exactly as the host declared it (empty if absent).
    pub content_type: String,
    /// The URL the bytes were fetched from.
    pub url: Url,
}

/// Retrieves raw blob bytes from a host.
#[async_trait]
pub trait HostFetcher: Send + Sync {
    async fn fetch(
        &self,
        host: &Url,
        owner: &str,
        id: &ContentId,
    ) -> Result<FetchedBlob, FetchError>;
}

/// Extract the error message from a JSON body, if it is an XRPC error
/// (`{"error": "...", "message": "..."}`).
///
/// Bodies that are not objects, or whose `error` field is absent, empty, or
/// not a string, are not errors: a JSON document can be a legitimate blob.
fn remote_error(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    let error = object
        .get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())?;
    Some(match object.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => format!("{error}: {message}"),
        _ => error.to_string(),
    })
}

/// Host client speaking the `com.atproto.sync.getBlob` XRPC method.
#[derive(Debug, Clone)]
pub struct HttpHostFetcher {
    http: reqwest::Client,
}

impl HttpHostFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `{host}/xrpc/com.atproto.sync.getBlob?did={owner}&cid={id}`.
    pub fn blob_url(host: &Url, owner: &str, id: &ContentId) -> Result<Url, FetchError> {
        let mut url = host.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidHost(host.to_string()))?
            .pop_if_empty()
            .extend(["xrpc", GET_BLOB_NSID]);
        url.query_pairs_mut()
            .clear()
            .append_pair("did", owner)
            .append_pair("cid", &id.to_string());
        Ok(url)
    }
}

#[async_trait]
impl HostFetcher for HttpHostFetcher {
    async fn fetch(
        &self,
        host: &Url,
        owner: &str,
        id: &ContentId,
    ) -> Result<FetchedBlob, FetchError> {
        let url = Self::blob_url(host, owner, id)?;
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let resp = self.http.get(url.clone()).send().await.map_err(transport)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::NotOk {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let data = resp.bytes().await.map_err(transport)?;

        if content_type.contains("application/json") {
            if let Some(message) = remote_error(&data) {
                return Err(FetchError::Remote { message });
            }
        }

        debug!(%url, size = data.len(), %content_type, "host fetch complete");
        Ok(FetchedBlob {
            data,
            content_type,
            url,
        })
    }
}

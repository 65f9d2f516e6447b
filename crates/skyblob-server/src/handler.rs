use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use skyblob_resolver::{BlobResolver, Cancellation};
use skyblob_types::{Blob, Provenance};

use crate::error::ServerResult;

/// Content type served when the host declared none (or an unusable one).
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<BlobResolver>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(resolver: Arc<BlobResolver>, request_timeout: Duration) -> Self {
        Self {
            resolver,
            request_timeout,
        }
    }

    async fn resolve(&self, owner: &str, cid: &str) -> ServerResult<Blob> {
        let cancel = Cancellation::none().with_timeout(self.request_timeout);
        Ok(self.resolver.resolve(owner, cid, &cancel).await?)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Metadata view of a resolved blob.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetaResponse {
    pub cid: String,
    pub size: u64,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Provenance>,
}

impl From<&Blob> for BlobMetaResponse {
    fn from(blob: &Blob) -> Self {
        Self {
            cid: blob.id().to_string(),
            size: blob.size(),
            content_type: blob.content_type().to_string(),
            source: blob.provenance().cloned(),
        }
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /v1/blob/:owner/:cid` -- the blob bytes, typed as the host declared.
pub async fn blob_handler(
    State(state): State<AppState>,
    Path((owner, cid)): Path<(String, String)>,
) -> ServerResult<Response> {
    let blob = state.resolve(&owner, &cid).await?;
    let content_type = HeaderValue::from_str(blob.content_type())
        .ok()
        .filter(|_| !blob.content_type().is_empty())
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    Ok(([(CONTENT_TYPE, content_type)], blob.into_data()).into_response())
}

/// `GET /v1/blob/:owner/:cid/meta`
pub async fn blob_meta_handler(
    State(state): State<AppState>,
    Path((owner, cid)): Path<(String, String)>,
) -> ServerResult<Json<BlobMetaResponse>> {
    let blob = state.resolve(&owner, &cid).await?;
    Ok(Json(BlobMetaResponse::from(&blob)))
}

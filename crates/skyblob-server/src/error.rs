use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use skyblob_resolver::{ConfigError, ResolveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Resolve(e) => match e {
                ResolveError::MalformedIdentifier(_)
                | ResolveError::IdentifierCanonicalMismatch { .. } => StatusCode::BAD_REQUEST,
                ResolveError::DirectoryNotFound { .. } => StatusCode::NOT_FOUND,
                ResolveError::Directory(_)
                | ResolveError::FetchNotOk { .. }
                | ResolveError::FetchRemoteError { .. }
                | ResolveError::FetchTransportError { .. }
                | ResolveError::HashMismatch { .. } => StatusCode::BAD_GATEWAY,
                ResolveError::Cancelled { .. } | ResolveError::DeadlineExceeded { .. } => {
                    StatusCode::GATEWAY_TIMEOUT
                }
                ResolveError::Client(_) | ResolveError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolve(e) => match e {
                ResolveError::MalformedIdentifier(_) => "MalformedIdentifier",
                ResolveError::IdentifierCanonicalMismatch { .. } => "IdentifierCanonicalMismatch",
                ResolveError::DirectoryNotFound { .. } => "DirectoryNotFound",
                ResolveError::Directory(_) => "DirectoryError",
                ResolveError::FetchNotOk { .. } => "FetchNotOk",
                ResolveError::FetchRemoteError { .. } => "FetchRemoteError",
                ResolveError::FetchTransportError { .. } => "FetchTransportError",
                ResolveError::HashMismatch { .. } => "HashMismatch",
                ResolveError::Cancelled { .. } => "Cancelled",
                ResolveError::DeadlineExceeded { .. } => "DeadlineExceeded",
                ResolveError::Client(_) | ResolveError::Config(_) => "InternalError",
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, %status, "request failed");
        }
        (
            status,
            Json(json!({ "error": self.kind(), "message": self.to_string() })),
        )
            .into_response()
    }
}

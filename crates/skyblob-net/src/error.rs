use thiserror::Error;

/// Errors from directory lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory has no host entries for the owner.
    #[error("owner {owner} not found in directory")]
    NotFound { owner: String },

    #[error("directory request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("directory returned status {status} for {owner}")]
    Status { owner: String, status: u16 },

    /// Missing or incorrectly-typed fields, or unusable host URLs.
    #[error("malformed directory response for {owner}: {reason}")]
    Malformed { owner: String, reason: String },
}

/// Errors from host blob fetches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("host returned status {status} for {url}")]
    NotOk { status: u16, url: String },

    /// The host answered with a structured error payload instead of bytes.
    #[error("host reported error: {message}")]
    Remote { message: String },

    #[error("transport error fetching {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("host URL {0} cannot carry a request path")]
    InvalidHost(String),
}

/// Errors building an HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("invalid user agent {0:?}")]
    InvalidUserAgent(String),
}

use skyblob_net::{ClientError, DirectoryError, FetchError};
use skyblob_types::IdentifierError;
use thiserror::Error;

use crate::cancel::Step;

/// Why a resolution produced no blob.
///
/// Cache corruption and cache write failures never appear here: the first
/// is handled as a miss and the second is logged and swallowed.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(IdentifierError),

    /// The identifier decoded but is not in its canonical encoding.
    #[error("identifier {given} is not canonical (expected {canonical})")]
    IdentifierCanonicalMismatch { given: String, canonical: String },

    #[error("owner {owner} not found in directory")]
    DirectoryNotFound { owner: String },

    #[error("directory lookup failed: {0}")]
    Directory(DirectoryError),

    #[error("host returned status {status} for {url}")]
    FetchNotOk { status: u16, url: String },

    #[error("host reported error: {message}")]
    FetchRemoteError { message: String },

    #[error("fetch from {url} failed: {reason}")]
    FetchTransportError { url: String, reason: String },

    /// Fetched bytes hash to a different identifier than requested.
    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("resolution cancelled during {step}")]
    Cancelled { step: Step },

    #[error("deadline exceeded during {step}")]
    DeadlineExceeded { step: Step },

    /// The HTTP clients could not be constructed.
    #[error("client setup failed: {0}")]
    Client(#[from] ClientError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ResolveError {
    /// `true` for failures caused by the remote side rather than the request.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Directory(_)
                | Self::FetchNotOk { .. }
                | Self::FetchRemoteError { .. }
                | Self::FetchTransportError { .. }
                | Self::HashMismatch { .. }
        )
    }
}

impl From<IdentifierError> for ResolveError {
    fn from(e: IdentifierError) -> Self {
        match e {
            IdentifierError::NonCanonical { given, canonical } => {
                Self::IdentifierCanonicalMismatch { given, canonical }
            }
            other => Self::MalformedIdentifier(other),
        }
    }
}

impl From<DirectoryError> for ResolveError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound { owner } => Self::DirectoryNotFound { owner },
            other => Self::Directory(other),
        }
    }
}

impl From<FetchError> for ResolveError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::NotOk { status, url } => Self::FetchNotOk { status, url },
            FetchError::Remote { message } => Self::FetchRemoteError { message },
            FetchError::Transport { url, reason } => Self::FetchTransportError { url, reason },
            FetchError::InvalidHost(url) => Self::FetchTransportError {
                url,
                reason: "host URL cannot carry a request path".into(),
            },
        }
    }
}

/// Result alias for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors loading or validating a [`ResolverConfig`](crate::ResolverConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_canonical_maps_to_canonical_mismatch() {
        let err: ResolveError = IdentifierError::NonCanonical {
            given: "B".into(),
            canonical: "b".into(),
        }
        .into();
        assert!(matches!(err, ResolveError::IdentifierCanonicalMismatch { .. }));

        let err: ResolveError = IdentifierError::Malformed("junk".into()).into();
        assert!(matches!(err, ResolveError::MalformedIdentifier(_)));
    }

    #[test]
    fn directory_not_found_is_distinguished() {
        let err: ResolveError = DirectoryError::NotFound { owner: "x".into() }.into();
        assert!(matches!(err, ResolveError::DirectoryNotFound { ref owner } if owner == "x"));
        assert!(!err.is_upstream());

        let err: ResolveError = DirectoryError::Status {
            owner: "x".into(),
            status: 500,
        }
        .into();
        assert!(matches!(err, ResolveError::Directory(_)));
        assert!(err.is_upstream());
    }

    #[test]
    fn fetch_errors_map_one_to_one() {
        let err: ResolveError = FetchError::NotOk {
            status: 404,
            url: "u".into(),
        }
        .into();
        assert!(matches!(err, ResolveError::FetchNotOk { status: 404, .. }));

        let err: ResolveError = FetchError::Remote {
            message: "BlobNotFound".into(),
        }
        .into();
        assert_eq!(err.to_string(), "host reported error: BlobNotFound");

        let err: ResolveError = FetchError::InvalidHost("mailto:x".into()).into();
        assert!(matches!(err, ResolveError::FetchTransportError { .. }));
    }

    #[test]
    fn display_names_step() {
        let err = ResolveError::Cancelled { step: Step::Fetch };
        assert_eq!(err.to_string(), "resolution cancelled during host fetch");
    }
}

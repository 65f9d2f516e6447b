//! Network side of blob resolution.
//!
//! Two collaborators, each behind a trait so the resolver can be driven by
//! test doubles:
//!
//! - [`DirectoryResolver`] maps an owner reference (DID or handle) to the
//!   hosts serving that owner and the owner's canonical DID.
//!   [`HttpDirectory`] queries `GET {directory}/{owner}`.
//! - [`HostFetcher`] retrieves raw blob bytes from a host.
//!   [`HttpHostFetcher`] calls
//!   `GET {host}/xrpc/com.atproto.sync.getBlob?did={owner}&cid={cid}`.
//!
//! Neither component retries, and the fetcher never verifies content:
//! integrity is the caller's job.

pub mod client;
pub mod directory;
pub mod error;
pub mod fetcher;

pub use client::{build_http_client, DEFAULT_USER_AGENT};
pub use directory::{DirectoryRecord, DirectoryResolver, HttpDirectory, DEFAULT_DIRECTORY_URL};
pub use error::{ClientError, DirectoryError, FetchError};
pub use fetcher::{FetchedBlob, HostFetcher, HttpHostFetcher, GET_BLOB_NSID};

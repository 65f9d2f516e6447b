//! Blob resolution for skyblob.
//!
//! Resolving an `(owner, cid)` pair runs a fixed sequence of steps:
//!
//! ```text
//! parse → cache lookup ─hit──────────────────────────────────────→ blob
//!                      └miss/corrupt→ directory → fetch → verify → persist → blob
//! ```
//!
//! A blob is only ever returned (or cached) once its bytes hash to the
//! requested identifier. Nothing is retried. Each suspension point can be
//! cancelled or bounded by a deadline through [`Cancellation`].
//!
//! The convenience entry point [`resolve_blob`] wires the filesystem cache
//! and the default HTTP clients together; [`BlobResolver`] accepts any
//! [`BlobStore`](skyblob_store::BlobStore),
//! [`DirectoryResolver`](skyblob_net::DirectoryResolver) and
//! [`HostFetcher`](skyblob_net::HostFetcher).

pub mod cancel;
pub mod config;
pub mod error;
pub mod resolver;

pub use cancel::{CancelHandle, Cancellation, Step};
pub use config::ResolverConfig;
pub use error::{ConfigError, ResolveError, ResolveResult};
pub use resolver::{resolve_blob, BlobResolver};

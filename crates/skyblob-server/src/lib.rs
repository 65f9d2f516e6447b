//! HTTP front end for skyblob.
//!
//! Exposes blob resolution over HTTP:
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/v1/health` | `{"status":"ok","version":...}` |
//! | GET | `/v1/blob/:owner/:cid` | blob bytes, `Content-Type` as served by the host |
//! | GET | `/v1/blob/:owner/:cid/meta` | `{"cid","size","contentType","source"}` |
//!
//! Failures are JSON `{"error","message"}` bodies: 400 for a malformed or
//! non-canonical identifier, 404 for an owner the directory does not know,
//! 502 for upstream failures and hash mismatches, 504 on timeout.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, BlobMetaResponse, HealthResponse};
pub use server::SkyblobServer;

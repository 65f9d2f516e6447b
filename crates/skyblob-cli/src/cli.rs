use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use skyblob_types::{HashFunction, DAG_CBOR_CODEC, DAG_PB_CODEC, RAW_CODEC};

#[derive(Parser)]
#[command(
    name = "skyblob",
    about = "Resolve, cache, and verify content-addressed blobs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Cache root directory (overrides the config file and SKYBLOB_CACHE_ROOT)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML config file (`bind_addr`, `request_timeout_secs`, `[resolver]`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a blob through the cache, fetching it if needed
    Resolve(ResolveArgs),
    /// Show a cached blob's metadata without touching the network
    Show(ShowArgs),
    /// Re-hash every cache entry
    Verify(VerifyArgs),
    /// Compute the content identifier of a file
    Cid(CidArgs),
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Owner DID or handle
    pub owner: String,
    pub cid: String,
    /// Write the blob bytes to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub cid: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Remove entries that are corrupt or fail verification
    #[arg(long)]
    pub prune: bool,
}

#[derive(Args)]
pub struct CidArgs {
    pub file: PathBuf,
    #[arg(long, default_value = "sha2-256")]
    pub hash: HashFunction,
    #[arg(long, default_value = "raw")]
    pub codec: CodecArg,
    /// Emit a legacy v0 identifier (implies dag-pb and sha2-256)
    #[arg(long, conflicts_with_all = ["hash", "codec"])]
    pub v0: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address (overrides the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CodecArg {
    Raw,
    DagPb,
    DagCbor,
}

impl CodecArg {
    pub fn code(self) -> u64 {
        match self {
            Self::Raw => RAW_CODEC,
            Self::DagPb => DAG_PB_CODEC,
            Self::DagCbor => DAG_CBOR_CODEC,
        }
    }
}

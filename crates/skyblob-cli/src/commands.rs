use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use skyblob_crypto::BlobHasher;
use skyblob_resolver::{BlobResolver, Cancellation};
use skyblob_server::{BlobMetaResponse, ServerConfig, SkyblobServer};
use skyblob_store::{BlobStore, CacheLookup, FsBlobStore};
use skyblob_types::{Blob, ContentId};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Resolve(args) => cmd_resolve(&config, args, &cli.format).await,
        Command::Show(args) => cmd_show(&config, args, &cli.format).await,
        Command::Verify(args) => cmd_verify(&config, args, &cli.format).await,
        Command::Cid(args) => cmd_cid(args),
        Command::Serve(args) => cmd_serve(config, args).await,
    }
}

/// Config file, then `SKYBLOB_*` environment, then `--root`.
fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.resolver = config.resolver.with_env_overrides()?;
    if let Some(root) = &cli.root {
        config.resolver.cache_root = root.clone();
    }
    Ok(config)
}

fn print_blob(blob: &Blob, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&BlobMetaResponse::from(blob))?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Blob".bold(), blob.id().to_string().yellow());
            println!("  Size: {} bytes", blob.size());
            println!("  Content-Type: {}", blob.content_type().cyan());
            if let Some(source) = blob.provenance() {
                println!("  Owner: {}", source.owner);
                println!("  Host: {}", source.host.blue());
            }
        }
    }
    Ok(())
}

async fn cmd_resolve(
    config: &ServerConfig,
    args: ResolveArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let resolver = BlobResolver::from_config(&config.resolver)?;
    let (handle, cancel) = Cancellation::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let blob = resolver.resolve(&args.owner, &args.cid, &cancel).await?;
    if let Some(out) = &args.out {
        tokio::fs::write(out, blob.data())
            .await
            .with_context(|| format!("writing {}", out.display()))?;
    }
    print_blob(&blob, format)?;
    if let (Some(out), OutputFormat::Text) = (&args.out, format) {
        println!("{} Wrote {}", "✓".green().bold(), out.display().to_string().bold());
    }
    Ok(())
}

async fn cmd_show(
    config: &ServerConfig,
    args: ShowArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let id = ContentId::parse(&args.cid)?;
    let store = FsBlobStore::new(config.resolver.cache_root.clone());
    match store.get(&id).await? {
        CacheLookup::Hit(blob) => print_blob(&blob, format),
        CacheLookup::Absent => bail!("{id} is not cached under {}", store.root().display()),
        CacheLookup::Corrupt { reason } => bail!("cache entry for {id} is corrupt: {reason}"),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub ok: usize,
    /// Entries that failed, with the reason.
    pub bad: Vec<(ContentId, String)>,
    pub pruned: usize,
}

/// Re-hash every entry in `store`, removing failures when `prune` is set.
pub async fn verify_store(store: &dyn BlobStore, prune: bool) -> anyhow::Result<VerifyReport> {
    let mut report = VerifyReport::default();
    for id in store.list().await? {
        let failure = match store.get(&id).await? {
            CacheLookup::Hit(blob) if BlobHasher::verify(&id, blob.data()) => None,
            CacheLookup::Hit(blob) => Some(format!(
                "content hashes to {}",
                BlobHasher::digest(&id, blob.data())?
            )),
            CacheLookup::Absent => continue,
            CacheLookup::Corrupt { reason } => Some(reason),
        };
        match failure {
            None => report.ok += 1,
            Some(reason) => {
                if prune && store.remove(&id).await? {
                    report.pruned += 1;
                }
                report.bad.push((id, reason));
            }
        }
    }
    Ok(report)
}

async fn cmd_verify(
    config: &ServerConfig,
    args: VerifyArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let store = FsBlobStore::new(config.resolver.cache_root.clone());
    let report = verify_store(&store, args.prune).await?;

    match format {
        OutputFormat::Json => {
            let bad: Vec<_> = report
                .bad
                .iter()
                .map(|(id, reason)| serde_json::json!({ "cid": id.to_string(), "reason": reason }))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ok": report.ok,
                    "bad": bad,
                    "pruned": report.pruned,
                }))?
            );
        }
        OutputFormat::Text => {
            for (id, reason) in &report.bad {
                println!("  {} {} ({})", "✗".red().bold(), id.to_string().yellow(), reason);
            }
            let mark = if report.bad.is_empty() {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            println!(
                "{} {} verified, {} bad, {} pruned",
                mark,
                report.ok.to_string().bold(),
                report.bad.len(),
                report.pruned
            );
        }
    }

    if !report.bad.is_empty() && !args.prune {
        bail!("{} cache entries failed verification", report.bad.len());
    }
    Ok(())
}

pub fn compute_cid(path: &Path, args: &CidArgs) -> anyhow::Result<ContentId> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(if args.v0 {
        BlobHasher::cid_v0(&data)?
    } else {
        BlobHasher::cid_v1(args.codec.code(), args.hash, &data)?
    })
}

fn cmd_cid(args: CidArgs) -> anyhow::Result<()> {
    println!("{}", compute_cid(&args.file, &args)?);
    Ok(())
}

async fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!(
        "skyblob server on {} (cache: {})",
        config.bind_addr.to_string().bold(),
        config.resolver.cache_root.display()
    );
    SkyblobServer::new(config)?.serve().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyblob_types::{HashFunction, RAW_CODEC};

    fn put_entry(root: &Path, id: &ContentId, meta_json: &str, payload: &[u8]) {
        let store = FsBlobStore::new(root);
        std::fs::create_dir_all(store.blobs_dir()).unwrap();
        std::fs::write(store.meta_path(id), meta_json).unwrap();
        std::fs::write(store.payload_path(id), payload).unwrap();
    }

    #[tokio::test]
    async fn verify_counts_good_and_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let good = BlobHasher::cid_v1(RAW_CODEC, HashFunction::Sha2_256, b"hello").unwrap();
        store
            .put(&Blob::new(good, "text/plain", &b"hello"[..], None))
            .await
            .unwrap();

        // Same length as the recorded size, wrong bytes.
        let tampered = BlobHasher::cid_v1(RAW_CODEC, HashFunction::Sha2_256, b"world").unwrap();
        put_entry(dir.path(), &tampered, r#"{"size":5,"contentType":"text/plain"}"#, b"WORLD");

        let report = verify_store(&store, false).await.unwrap();
        assert_eq!(report.ok, 1);
        assert_eq!(report.bad.len(), 1);
        assert_eq!(report.bad[0].0, tampered);
        assert_eq!(report.pruned, 0);
        assert!(store.meta_path(&tampered).exists());
    }

    #[tokio::test]
    async fn verify_prune_removes_corrupt_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let id = BlobHasher::cid_v1(RAW_CODEC, HashFunction::Sha2_256, b"short").unwrap();
        put_entry(dir.path(), &id, r#"{"size":99,"contentType":""}"#, b"short");

        let report = verify_store(&store, true).await.unwrap();
        assert_eq!(report.ok, 0);
        assert_eq!(report.pruned, 1);
        assert_eq!(store.get(&id).await.unwrap(), CacheLookup::Absent);
    }

    #[test]
    fn compute_cid_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();
        let args = CidArgs {
            file: path.clone(),
            hash: HashFunction::Sha2_256,
            codec: CodecArg::Raw,
            v0: false,
        };
        assert_eq!(
            compute_cid(&path, &args).unwrap().to_string(),
            "bafkreibm6jg3ux5qumhcn2b3flc3tyu6dmlb4xa7u5bf44yegnrjhc4yeq"
        );

        let v0 = CidArgs { v0: true, ..args };
        assert!(compute_cid(&path, &v0).unwrap().to_string().starts_with("Qm"));
    }

    #[test]
    fn compute_cid_missing_file_is_error() {
        let args = CidArgs {
            file: "/nonexistent/skyblob".into(),
            hash: HashFunction::Blake3,
            codec: CodecArg::Raw,
            v0: false,
        };
        assert!(compute_cid(&args.file, &args).is_err());
    }
}

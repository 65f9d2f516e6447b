use std::sync::Arc;

use skyblob_resolver::BlobResolver;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Blob resolution server.
pub struct SkyblobServer {
    config: ServerConfig,
    resolver: Arc<BlobResolver>,
}

impl SkyblobServer {
    /// Server backed by the filesystem cache and HTTP clients in `config`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let resolver = Arc::new(BlobResolver::from_config(&config.resolver)?);
        Ok(Self::with_resolver(config, resolver))
    }

    pub fn with_resolver(config: ServerConfig, resolver: Arc<BlobResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            self.resolver.clone(),
            self.config.request_timeout(),
        ))
    }

    /// Start serving requests until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            cache_root = %self.config.resolver.cache_root.display(),
            "skyblob server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

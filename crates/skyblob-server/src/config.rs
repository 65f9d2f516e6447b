use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skyblob_resolver::{ConfigError, ResolverConfig};

/// Server settings. The `[resolver]` table configures resolution.
///
/// ```toml
/// bind_addr = "0.0.0.0:8080"
/// request_timeout_secs = 60
///
/// [resolver]
/// cache_root = "/var/cache/skyblob"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on one resolution, across all of its steps.
    pub request_timeout_secs: u64,
    pub resolver: ResolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            request_timeout_secs: 60,
            resolver: ResolverConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.request_timeout(), Duration::from_secs(60));
        assert_eq!(c.resolver, ResolverConfig::default());
    }

    #[test]
    fn nested_resolver_table() {
        let c: ServerConfig = toml::from_str(
            r#"
            bind_addr = "0.0.0.0:9000"

            [resolver]
            cache_root = "/srv/blobs"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.resolver.cache_root, PathBuf::from("/srv/blobs"));
        assert_eq!(c.request_timeout_secs, 60);
    }
}

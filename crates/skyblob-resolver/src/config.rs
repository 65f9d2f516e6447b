use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skyblob_net::{DEFAULT_DIRECTORY_URL, DEFAULT_USER_AGENT};
use url::Url;

use crate::error::ConfigError;

pub const ENV_CACHE_ROOT: &str = "SKYBLOB_CACHE_ROOT";
pub const ENV_DIRECTORY_URL: &str = "SKYBLOB_DIRECTORY_URL";
pub const ENV_TIMEOUT_SECS: &str = "SKYBLOB_TIMEOUT_SECS";

/// Settings for building a [`BlobResolver`](crate::BlobResolver).
///
/// ```toml
/// cache_root = "/var/cache/skyblob"
/// directory_url = "https://api.atscan.net"
/// timeout_secs = 30
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Cache entries live under `{cache_root}/blobs/`.
    pub cache_root: PathBuf,
    pub directory_url: String,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from("."),
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = root.into();
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Apply `SKYBLOB_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(root) = lookup(ENV_CACHE_ROOT) {
            self.cache_root = PathBuf::from(root);
        }
        if let Some(url) = lookup(ENV_DIRECTORY_URL) {
            self.directory_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS.into(),
                value: secs.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn directory_url(&self) -> Result<Url, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: "directory_url".into(),
            value: self.directory_url.clone(),
        };
        let url = Url::parse(&self.directory_url).map_err(|_| invalid())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(invalid()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let c = ResolverConfig::default();
        assert_eq!(c.cache_root, PathBuf::from("."));
        assert_eq!(c.directory_url().unwrap().as_str(), "https://api.atscan.net/");
        assert_eq!(c.timeout(), Duration::from_secs(30));
        assert!(c.user_agent.starts_with("skyblob/"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ResolverConfig::from_toml_str("cache_root = \"/tmp/blobs\"\n").unwrap();
        assert_eq!(c.cache_root, PathBuf::from("/tmp/blobs"));
        assert_eq!(c.timeout_secs, 30);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            ResolverConfig::from_toml_str("timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyblob.toml");
        let config = ResolverConfig::default().with_cache_root("/srv/cache");
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();
        assert_eq!(ResolverConfig::from_toml_file(&path).unwrap(), config);
    }

    #[test]
    fn overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_CACHE_ROOT, "/data"),
            (ENV_DIRECTORY_URL, "http://localhost:8080"),
            (ENV_TIMEOUT_SECS, " 5 "),
        ]
        .into_iter()
        .collect();
        let c = ResolverConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(c.cache_root, PathBuf::from("/data"));
        assert_eq!(c.directory_url().unwrap().port(), Some(8080));
        assert_eq!(c.timeout_secs, 5);
    }

    #[test]
    fn invalid_timeout_override_is_rejected() {
        let err = ResolverConfig::default()
            .with_overrides(|k| (k == ENV_TIMEOUT_SECS).then(|| "never".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == ENV_TIMEOUT_SECS
        ));
    }

    #[test]
    fn non_http_directory_is_rejected() {
        let mut c = ResolverConfig::default();
        c.directory_url = "ftp://dir.example".into();
        assert!(c.directory_url().is_err());
        c.directory_url = "not a url".into();
        assert!(c.directory_url().is_err());
    }
}

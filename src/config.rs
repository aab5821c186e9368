//! Configuration file support.
//!
//! ```toml
//! [copy]
//! ignore_empty = true
//! deep_copy = true
//!
//! [cache]
//! default_ttl = "15m"
//! key_prefix = "app:"
//!
//! [log]
//! filter = "info,copy_engine=debug"
//! ```
//!
//! Every section and key is optional.

pub mod duration;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use copy_engine::CopyOptions;
use data_layer::{Cache, KeyValueStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use duration::parse_duration;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "TYPEBRIDGE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub copy: CopyOptions,
    pub cache: CacheConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Duration string ("300", "30s", "15m", ...); unset means no expiry.
    pub default_ttl: Option<String>,
    pub key_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration at `path`.
    ///
    /// No path, or a path that does not exist, yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate TOML configuration text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.cache.default_ttl()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> anyhow::Result<Option<Duration>> {
        self.default_ttl
            .as_deref()
            .map(parse_duration)
            .transpose()
            .context("Invalid cache.default_ttl")
    }

    /// Cache over `store` with the configured TTL and prefix.
    pub fn build(&self, store: Arc<dyn KeyValueStore>) -> anyhow::Result<Cache> {
        Ok(Cache::new(store)
            .with_default_ttl(self.default_ttl()?)
            .with_key_prefix(self.key_prefix.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.cache.default_ttl().unwrap(), None);
    }

    #[test]
    fn test_sections() {
        let config = Config::parse(
            r#"
            [copy]
            ignore_empty = true
            strict = true

            [cache]
            default_ttl = "15m"
            key_prefix = "app:"
            "#,
        )
        .unwrap();
        assert!(config.copy.ignore_empty);
        assert!(config.copy.strict);
        assert!(!config.copy.deep_copy);
        assert_eq!(
            config.cache.default_ttl().unwrap(),
            Some(Duration::from_secs(900))
        );
        assert_eq!(config.cache.key_prefix, "app:");
    }

    #[test]
    fn test_invalid_ttl_is_rejected() {
        let err = Config::parse("[cache]\ndefault_ttl = \"soon\"").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid cache.default_ttl"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.copy = CopyOptions::transport();
        config.cache.default_ttl = Some("30s".into());
        let text = config.to_toml().unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}

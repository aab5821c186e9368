//! Value cache over a [`KeyValueStore`].
//!
//! Values are stored as text: strings raw, booleans and numbers as their
//! literal, everything else as compact JSON produced by the reflection codec.
//! Reads can return the raw text or decode it into any reflected value.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reflect_core::{decode_into, encode, DecodeOptions, Reflect, ScalarKind, ShapeKind};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::store::KeyValueStore;

/// Upper bound for fire-and-forget cache writes.
pub const BACKGROUND_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache wrapper with an optional default TTL and key prefix.
///
/// Clones share the underlying store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    default_ttl: Option<Duration>,
    key_prefix: String,
}

impl Cache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            default_ttl: None,
            key_prefix: String::new(),
        }
    }

    /// TTL used when a write does not pass one.
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Prefix prepended to every key.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Store `value` under `key`. `ttl` falls back to the default TTL.
    pub async fn set(&self, key: &str, value: &dyn Reflect, ttl: Option<Duration>) -> Result<()> {
        let bytes = encode_value(value)
            .with_context(|| format!("Failed to encode cache value for '{key}'"))?;
        self.store
            .set(&self.full_key(key), bytes, ttl.or(self.default_ttl))
            .await
            .with_context(|| format!("Failed to set cache key '{key}'"))
    }

    /// Raw text under `key`, or None when missing.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let bytes = self
            .store
            .get(&self.full_key(key))
            .await
            .with_context(|| format!("Failed to get cache key '{key}'"))?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    /// Decode the value under `key` into `target`.
    ///
    /// Returns the raw text, or None (leaving `target` untouched) when the key
    /// is missing.
    pub async fn get_into(&self, key: &str, target: &mut dyn Reflect) -> Result<Option<String>> {
        let Some(text) = self.get(key).await? else {
            return Ok(None);
        };
        // Strings are stored raw, so text that is not JSON is read as one.
        let value = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));
        decode_into(target, &value, &DecodeOptions::weak())
            .with_context(|| format!("Failed to decode cache key '{key}'"))?;
        Ok(Some(text))
    }

    /// Remove `key`. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.store
            .delete(&self.full_key(key))
            .await
            .with_context(|| format!("Failed to delete cache key '{key}'"))
    }

    /// Set a new TTL on `key`. Returns whether it existed.
    pub async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.store
            .expire(&self.full_key(key), ttl)
            .await
            .with_context(|| format!("Failed to refresh TTL of cache key '{key}'"))
    }

    /// Store `value` in the background. Failures and timeouts are logged.
    pub fn spawn_set<T: Reflect>(
        &self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Duration>,
    ) -> JoinHandle<()> {
        let cache = self.clone();
        let key = key.into();
        tokio::spawn(async move {
            match tokio::time::timeout(BACKGROUND_TIMEOUT, cache.set(&key, &value, ttl)).await {
                Ok(Ok(())) => debug!(key, "Background cache set finished"),
                Ok(Err(e)) => error!(key, "Background cache set failed: {e:#}"),
                Err(_) => error!(key, "Background cache set timed out"),
            }
        })
    }

    /// Remove `key` in the background. Failures and timeouts are logged.
    pub fn spawn_delete(&self, key: impl Into<String>) -> JoinHandle<()> {
        let cache = self.clone();
        let key = key.into();
        tokio::spawn(async move {
            match tokio::time::timeout(BACKGROUND_TIMEOUT, cache.delete(&key)).await {
                Ok(Ok(_)) => debug!(key, "Background cache delete finished"),
                Ok(Err(e)) => error!(key, "Background cache delete failed: {e:#}"),
                Err(_) => error!(key, "Background cache delete timed out"),
            }
        })
    }
}

/// Text form of a cached value.
pub fn encode_value(value: &dyn Reflect) -> Result<Vec<u8>> {
    let text = match (value.type_shape().kind, encode(value)?) {
        (ShapeKind::Scalar(ScalarKind::String), Value::String(s)) => s,
        (ShapeKind::Scalar(ScalarKind::Bool), Value::Bool(b)) => {
            String::from(if b { "1" } else { "0" })
        }
        (ShapeKind::Scalar(ScalarKind::Int | ScalarKind::Uint | ScalarKind::Float), number) => {
            number.to_string()
        }
        (_, other) => serde_json::to_string(&other)?,
    };
    Ok(text.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_basic_values_as_text() {
        assert_eq!(encode_value(&"plain text".to_string()).unwrap(), b"plain text");
        assert_eq!(encode_value(&42i64).unwrap(), b"42");
        assert_eq!(encode_value(&1.5f64).unwrap(), b"1.5");
        assert_eq!(encode_value(&true).unwrap(), b"1");
        assert_eq!(encode_value(&false).unwrap(), b"0");
    }

    #[test]
    fn test_encode_lists_as_json() {
        let tags = vec!["a".to_string(), "b".to_string()];
        assert_eq!(encode_value(&tags).unwrap(), br#"["a","b"]"#);
        assert_eq!(encode_value(&None::<Vec<String>>).unwrap(), b"null");
    }
}

//! Request-scoped metadata.
//!
//! Authenticated requests carry string metadata (user id, name, tenant,
//! roles). Handlers read it through [`RequestContext`], typed on demand.

use std::collections::HashMap;

use thiserror::Error;

pub const UID_KEY: &str = "uid";
pub const NICK_NAME_KEY: &str = "nickName";
pub const ENTERPRISE_ID_KEY: &str = "enterpriseId";
pub const UNAME_KEY: &str = "uname";
pub const ROLE_KEY: &str = "role";

/// Error reason reported when a request carries no metadata.
pub const FAIL_VALIDATE: &str = "FAIL_VALIDATE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Unauthenticated request ({reason})")]
    Unauthenticated { reason: &'static str },
}

/// Case-insensitive string metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    values: HashMap<String, String>,
}

impl RequestMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.to_ascii_lowercase(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_ascii_lowercase()).map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RequestMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for (key, value) in iter {
            metadata.insert(key.as_ref(), value);
        }
        metadata
    }
}

/// Types readable from a metadata string.
///
/// A missing key reads as the empty string.
pub trait FromMetadata: Sized {
    fn from_metadata(raw: &str) -> Self;
}

impl FromMetadata for i64 {
    /// Unparsable values read as 0.
    fn from_metadata(raw: &str) -> Self {
        raw.parse().unwrap_or(0)
    }
}

impl FromMetadata for String {
    fn from_metadata(raw: &str) -> Self {
        raw.to_string()
    }
}

impl FromMetadata for Vec<String> {
    /// Comma-separated.
    fn from_metadata(raw: &str) -> Self {
        raw.split(',').map(str::to_string).collect()
    }
}

/// Per-request context holding the metadata of an authenticated caller.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    metadata: Option<RequestMetadata>,
}

impl RequestContext {
    /// A context without metadata.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: RequestMetadata) -> Self {
        Self {
            metadata: Some(metadata),
        }
    }

    pub fn metadata(&self) -> Option<&RequestMetadata> {
        self.metadata.as_ref()
    }

    /// Read `key` as `T`.
    pub fn get_typed<T: FromMetadata>(&self, key: &str) -> Result<T, MetadataError> {
        let metadata = self.metadata.as_ref().ok_or(MetadataError::Unauthenticated {
            reason: FAIL_VALIDATE,
        })?;
        Ok(T::from_metadata(metadata.get(key).unwrap_or_default()))
    }

    pub fn uid(&self) -> Result<i64, MetadataError> {
        self.get_typed(UID_KEY)
    }

    pub fn nick_name(&self) -> Result<String, MetadataError> {
        self.get_typed(NICK_NAME_KEY)
    }

    pub fn enterprise_id(&self) -> Result<i64, MetadataError> {
        self.get_typed(ENTERPRISE_ID_KEY)
    }

    pub fn uname(&self) -> Result<String, MetadataError> {
        self.get_typed(UNAME_KEY)
    }

    pub fn role_keys(&self) -> Result<Vec<String>, MetadataError> {
        self.get_typed(ROLE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RequestContext {
        RequestContext::with_metadata(RequestMetadata::from_iter([
            ("uid", "42"),
            ("nickName", "Ada"),
            ("enterpriseId", "not-a-number"),
            ("role", "admin,editor"),
        ]))
    }

    #[test]
    fn test_typed_reads() {
        let ctx = context();
        assert_eq!(ctx.uid().unwrap(), 42);
        assert_eq!(ctx.nick_name().unwrap(), "Ada");
        assert_eq!(ctx.enterprise_id().unwrap(), 0);
        assert_eq!(ctx.role_keys().unwrap(), vec!["admin", "editor"]);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let ctx = context();
        assert_eq!(ctx.get_typed::<String>("NICKNAME").unwrap(), "Ada");
    }

    #[test]
    fn test_missing_key_reads_as_empty() {
        let ctx = context();
        assert_eq!(ctx.uname().unwrap(), "");
        assert_eq!(ctx.get_typed::<i64>("missing").unwrap(), 0);
        assert_eq!(ctx.get_typed::<Vec<String>>("missing").unwrap(), vec![""]);
    }

    #[test]
    fn test_missing_metadata_is_unauthenticated() {
        let err = RequestContext::anonymous().uid().unwrap_err();
        assert_eq!(err, MetadataError::Unauthenticated { reason: FAIL_VALIDATE });
        assert_eq!(err.to_string(), "Unauthenticated request (FAIL_VALIDATE)");
    }
}

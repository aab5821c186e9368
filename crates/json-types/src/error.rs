//! Error types for JSON column conversions.

use thiserror::Error;

/// Errors returned by the reverse (wire → typed) conversions.
#[derive(Debug, Error)]
pub enum JsonTypesError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected json array, found {0}")]
    ExpectedArray(&'static str),

    #[error("expected json object, found {0}")]
    ExpectedObject(&'static str),

    #[error("expected json string, found {0}")]
    ExpectedString(&'static str),

    #[error("cannot parse {value:?} as datetime: {source}")]
    InvalidDateTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl JsonTypesError {
    /// Whether the input could not be read as JSON at all, or had the wrong shape.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::InvalidDateTime { .. })
    }
}

//! Error types for reflection and codec operations.

use thiserror::Error;

/// Errors that can occur while encoding or decoding reflected values.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// JSON value kind does not fit the target shape.
    #[error("{path}: expected {expected}, found {found}")]
    UnexpectedJson {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// String could not be parsed into the target scalar.
    #[error("{path}: cannot parse {value:?} as {target}")]
    Parse {
        path: String,
        value: String,
        target: &'static str,
    },

    /// Number does not fit the target scalar.
    #[error("{path}: {value} is out of range for {target}")]
    OutOfRange {
        path: String,
        value: String,
        target: &'static str,
    },

    /// Value cannot be represented as JSON.
    #[error("cannot encode {type_name}: {reason}")]
    Encode {
        type_name: &'static str,
        reason: String,
    },
}

impl ReflectError {
    pub(crate) fn unexpected(expected: &'static str, found: &serde_json::Value) -> Self {
        Self::UnexpectedJson {
            path: String::new(),
            expected,
            found: json_kind(found),
        }
    }

    pub(crate) fn parse(value: impl Into<String>, target: &'static str) -> Self {
        Self::Parse {
            path: String::new(),
            value: value.into(),
            target,
        }
    }

    pub(crate) fn out_of_range(value: impl ToString, target: &'static str) -> Self {
        Self::OutOfRange {
            path: String::new(),
            value: value.to_string(),
            target,
        }
    }

    /// Attach the field path where the error occurred, if none is set yet.
    pub fn at(mut self, location: &str) -> Self {
        match &mut self {
            Self::UnexpectedJson { path, .. }
            | Self::Parse { path, .. }
            | Self::OutOfRange { path, .. } => {
                if path.is_empty() {
                    *path = location.to_string();
                }
            }
            Self::Encode { .. } => {}
        }
        self
    }

    /// Prefix the error path with an enclosing key or `[index]` segment.
    pub fn within(mut self, segment: &str) -> Self {
        if let Self::UnexpectedJson { path, .. }
        | Self::Parse { path, .. }
        | Self::OutOfRange { path, .. } = &mut self
        {
            *path = if path.is_empty() {
                segment.to_string()
            } else if path.starts_with('[') {
                format!("{segment}{path}")
            } else {
                format!("{segment}.{path}")
            };
        }
        self
    }
}

/// Short name of a JSON value kind.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

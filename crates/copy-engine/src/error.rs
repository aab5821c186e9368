//! Error types for the copy-engine crate.

use reflect_core::ReflectError;
use thiserror::Error;

/// Boxed error returned by converter functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during a conversion.
///
/// Any error aborts the whole conversion; the destination may already hold
/// the fields processed before the failure.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Field types are incompatible and nothing can bridge them.
    /// Only raised when `CopyOptions::strict` is set.
    #[error("Type mismatch for field '{field}': cannot copy {from} into {to}")]
    TypeMismatch {
        field: String,
        from: &'static str,
        to: &'static str,
    },

    /// Bytes or JSON presented as a dynamic value have the wrong form.
    #[error("Malformed dynamic value for field '{field}': {source}")]
    MalformedDynamicValue {
        field: String,
        #[source]
        source: BoxError,
    },

    /// A registered converter function failed.
    #[error("Converter {from} -> {to} failed for field '{field}': {source}")]
    Converter {
        field: String,
        from: &'static str,
        to: &'static str,
        #[source]
        source: BoxError,
    },

    /// A converter produced a value of a different type than it was registered for.
    #[error("Converter {from} -> {to} returned a value of the wrong type")]
    ConverterOutput {
        from: &'static str,
        to: &'static str,
    },

    /// A value could not be encoded to its JSON form during a bridge pass.
    #[error("Encoding error for field '{field}': {source}")]
    Encoding {
        field: String,
        #[source]
        source: ReflectError,
    },
}

impl ConvertError {
    pub(crate) fn malformed(field: &str, source: impl Into<BoxError>) -> Self {
        Self::MalformedDynamicValue {
            field: field.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn encoding(field: &str, source: ReflectError) -> Self {
        Self::Encoding {
            field: field.to_string(),
            source,
        }
    }
}

/// Result type alias for copy-engine operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

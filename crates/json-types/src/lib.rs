//! Column and JSON conversions for typebridge value types.
//!
//! This crate provides the typed conversion functions behind the converter
//! registry: datetimes to and from their display strings, and string lists
//! and dynamic values to and from raw JSON column bytes.
//!
//! # Modules
//!
//! - [`forward`] - typed value → string or JSON bytes
//! - [`reverse`] - string or JSON bytes → typed value
//!
//! # Example
//!
//! ```rust
//! use json_types::{forward, reverse};
//!
//! let tags = reverse::json_to_string_list(br#"["a","b"]"#).unwrap();
//! assert_eq!(tags, Some(vec!["a".to_string(), "b".to_string()]));
//!
//! let bytes = forward::string_list_to_json(tags.as_deref());
//! assert_eq!(bytes.as_bytes(), br#"["a","b"]"#);
//!
//! // Dirty data written as an empty object reads as absent.
//! assert_eq!(reverse::json_to_string_list(b" {} ").unwrap(), None);
//! ```

pub mod error;
pub mod forward;
pub mod reverse;

pub use error::JsonTypesError;

/// Layout of a full datetime string, e.g. `2025-12-01 08:30:00`.
pub const LAYOUT_DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Parse layout of a full datetime; fractional seconds are accepted and kept.
pub const LAYOUT_DATE_TIME_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Layout of a date-only string, e.g. `2025-12-01`.
pub const LAYOUT_DATE_ONLY: &str = "%Y-%m-%d";

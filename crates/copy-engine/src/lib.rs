//! Type-directed object graph conversion.
//!
//! This crate copies values between structurally similar but distinct Rust
//! types, the way data-layer code moves rows between entity structs and
//! transport messages:
//!
//! - [`Copier`] - Conversion engine (field copy plus dynamic value bridge)
//! - [`ConverterRegistry`] - Ordered, first-match table of type converters
//! - [`MetadataCache`] - Memoized type scans and field index paths
//! - [`CopyOptions`] - Per-call flags (`ignore_empty`, `deep_copy`, `strict`)
//!
//! # Example
//!
//! ```rust
//! use copy_engine::{convert, CopyOptions};
//! use reflect_core::{impl_reflect_struct, DynamicValue};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct Meta {
//!     pub a: String,
//!     pub b: i64,
//! }
//! impl_reflect_struct!(Meta { a: String => "a", b: i64 => "b" });
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct Request {
//!     pub meta: Option<DynamicValue>,
//! }
//! impl_reflect_struct!(Request { meta: Option<DynamicValue> });
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct Command {
//!     pub meta: Option<Box<Meta>>,
//! }
//! impl_reflect_struct!(Command { meta: Option<Box<Meta>> });
//!
//! let request = Request {
//!     meta: Some(DynamicValue::try_from(json!({"a": "x", "b": 2})).unwrap()),
//! };
//! let mut command = Command::default();
//! convert(&mut command, &request, &CopyOptions::transport()).unwrap();
//!
//! let meta = command.meta.unwrap();
//! assert_eq!((meta.a.as_str(), meta.b), ("x", 2));
//! ```

mod bridge;
pub mod cache;
pub mod engine;
pub mod error;
pub mod options;
pub mod registry;

pub use cache::{FieldPair, MetadataCache};
pub use engine::{convert, convert_with, Copier};
pub use error::{BoxError, ConvertError, Result};
pub use options::CopyOptions;
pub use registry::{ConverterRegistry, TypeConverter};

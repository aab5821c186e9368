//! Runtime shape introspection for typebridge.
//!
//! This crate provides the foundational reflection layer used by the
//! conversion engine, including:
//!
//! - [`TypeShape`] - Closed set of shape variants describing a Rust type
//! - [`Reflect`] - Object-safe access to a value through its shape
//! - [`DynamicValue`] - Loosely-typed JSON object used as an interchange format
//! - [`Timestamp`], [`NullTime`], [`JsonBytes`] - Column-oriented scalar types
//! - [`codec`] - Shape-driven JSON encoding and decoding of any reflected value
//!
//! # Architecture
//!
//! ```text
//! reflect-core (this crate)
//!    │
//!    ├─── json-types    (typed converter functions over the value types)
//!    ├─── copy-engine   (engine, registry, bridge and metadata cache)
//!    └─── data-layer    (cache wrapper, request metadata, field allowlist)
//! ```
//!
//! # Example
//!
//! ```rust
//! use reflect_core::{impl_reflect_struct, Reflect, ShapeKind};
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct Meta {
//!     pub a: String,
//!     pub b: i64,
//! }
//!
//! impl_reflect_struct!(Meta {
//!     a: String => "a",
//!     b: i64 => "b",
//! });
//!
//! let shape = Meta::shape();
//! assert!(matches!(shape.kind, ShapeKind::Struct(fields) if fields.len() == 2));
//! ```

pub mod codec;
pub mod error;
mod impls;
mod macros;
pub mod reflect;
pub mod shape;
pub mod values;

pub use codec::{decode_into, encode, DecodeOptions};
pub use error::ReflectError;
pub use reflect::{
    field_by_path, field_by_path_mut, DynamicMut, Reflect, ReflectList, ReflectMut,
    ReflectPointer, ReflectRef, ReflectScalar, ReflectStruct,
};
pub use shape::{FieldShape, ScalarKind, ShapeKind, TypeShape};
pub use values::{DynamicValue, JsonBytes, NullTime, Timestamp};

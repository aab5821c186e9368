//! typebridge
//!
//! Type-directed conversion between the struct families of a data-access
//! layer: database entities, transport messages and loosely-typed dynamic
//! values.
//!
//! # Crates
//!
//! - `reflect_core` - Shapes, the `Reflect` trait, value types and the JSON codec
//! - `json_types` - Column converters (datetimes, JSON lists and objects)
//! - `copy_engine` - Conversion engine, converter registry and dynamic value bridge
//! - `data_layer` - Cache wrapper, request metadata and field allowlists
//!
//! # CLI Usage
//!
//! ```bash
//! # Normalise a datetime the way the nullable-time converters store it
//! typebridge time "2025-12-01 00:00:00"
//!
//! # Canonical re-encoding of a JSON column
//! echo '[ "a", "b" ]' | typebridge column string-list
//!
//! # Effective configuration
//! TYPEBRIDGE_CONFIG=typebridge.toml typebridge config
//! ```

pub mod config;
pub mod inspect;

// Re-export member crates for convenience
pub use copy_engine as engine;
pub use data_layer;
pub use json_types;
pub use reflect_core as reflect;

pub use copy_engine::{convert, convert_with, ConvertError, ConverterRegistry, Copier, CopyOptions};
pub use reflect_core::{impl_reflect_struct, DynamicValue, JsonBytes, NullTime, Reflect, Timestamp};

//! Data-access helpers that sit around typebridge conversions.
//!
//! - [`Cache`] - Text value cache over a [`KeyValueStore`], with [`MemoryStore`]
//! - [`RequestContext`] - Typed access to authenticated request metadata
//! - [`allowed_fields`] - Column allowlists for partial writes
//! - [`models`] - Audit columns shared by entity and transport structs

pub mod allowlist;
pub mod cache;
pub mod metadata;
pub mod models;
pub mod store;

pub use allowlist::{allowed_fields, allowed_fields_of, create_fields, update_fields, FieldOptions};
pub use cache::Cache;
pub use metadata::{FromMetadata, MetadataError, RequestContext, RequestMetadata};
pub use models::{
    AuditFields, AuditModel, CreateFields, FullFields, FullModel, HardDeleteModel, TimeFields,
    TimeModel, UpdateFields,
};
pub use store::{KeyValueStore, MemoryStore};

//! Field allowlists for partial inserts and updates.
//!
//! An allowlist names the columns a write may touch. It starts from the
//! fields of a reflected struct and is then adjusted per call.

use reflect_core::{Reflect, TypeShape};

pub const ENTERPRISE_ID_FIELD: &str = "enterprise_id";

/// Adjustments applied on top of a struct's own fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Appended when not already present.
    pub adds: Vec<String>,
    /// Removed.
    pub filters: Vec<String>,
    pub add_enterprise_id: bool,
    pub filter_enterprise_id: bool,
}

impl FieldOptions {
    pub fn add(mut self, field: impl Into<String>) -> Self {
        self.adds.push(field.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>) -> Self {
        self.filters.push(field.into());
        self
    }
}

/// Field names of `shape` (direct fields in declaration order, then the
/// promoted fields of flattened structs), adjusted by `options`: additions
/// first, filters last.
///
/// A pointer shape lists the fields of its pointee. Anything that is not a
/// struct yields only the additions.
pub fn allowed_fields(shape: &TypeShape, options: &FieldOptions) -> Vec<String> {
    let shape = match shape.elem() {
        Some(elem) if shape.is_pointer() => elem,
        _ => *shape,
    };
    let mut fields: Vec<String> = shape
        .leaf_fields()
        .into_iter()
        .map(|(_, field)| field.name.to_string())
        .collect();

    let enterprise_id = options
        .add_enterprise_id
        .then_some(ENTERPRISE_ID_FIELD.to_string());
    for add in options.adds.iter().cloned().chain(enterprise_id) {
        if !fields.contains(&add) {
            fields.push(add);
        }
    }

    fields.retain(|field| {
        !options.filters.contains(field)
            && !(options.filter_enterprise_id && field == ENTERPRISE_ID_FIELD)
    });
    fields
}

/// [`allowed_fields`] for a concrete type.
pub fn allowed_fields_of<T: Reflect>(options: &FieldOptions) -> Vec<String> {
    allowed_fields(&T::shape(), options)
}

/// Allowlist for an insert: adds the creator columns to a non-empty list.
///
/// An empty list means "all columns" and is returned unchanged.
pub fn create_fields(mut allow: Vec<String>) -> Vec<String> {
    if !allow.is_empty() {
        allow.extend(["create_id".to_string(), "create_by".to_string()]);
    }
    allow
}

/// Allowlist for an update: adds the updater columns to a non-empty list.
pub fn update_fields(mut allow: Vec<String>) -> Vec<String> {
    if !allow.is_empty() {
        allow.extend(["update_id".to_string(), "update_by".to_string()]);
    }
    allow
}

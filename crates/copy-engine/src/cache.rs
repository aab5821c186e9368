//! Reflection metadata cache.
//!
//! Two independent memo tables, both keyed by type identity and filled
//! lazily on first miss:
//!
//! - whether a type's reachable field tree contains a dynamic value node
//! - for a (source, destination) struct pair, where each source field lands
//!   in the destination
//!
//! Entries are never evicted. Their number is bounded by the distinct
//! reflected types in the program, not by the volume of conversions.
//! Concurrent first fills of the same key compute the same answer; the last
//! store wins and the map stays consistent.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use reflect_core::{ShapeKind, TypeShape};
use tracing::debug;

/// Where one source field lands in the destination struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    /// Matching name shared by both fields.
    pub name: &'static str,
    /// Index path of the field in the source struct.
    pub source: Vec<usize>,
    /// Index path in the destination struct, `None` when it has no such field.
    pub target: Option<Vec<usize>>,
}

/// Process-lifetime memoization of type metadata.
#[derive(Debug, Default)]
pub struct MetadataCache {
    dynamic_scan: DashMap<TypeId, bool>,
    field_pairs: DashMap<(TypeId, TypeId), Arc<[FieldPair]>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dynamic value or dynamic value list is reachable from `shape`
    /// through struct fields, pointers and lists.
    pub fn contains_dynamic(&self, shape: &TypeShape) -> bool {
        if let Some(hit) = self.dynamic_scan.get(&shape.id) {
            return *hit;
        }
        let mut visited = HashSet::new();
        let found = scan_for_dynamic(shape, &mut visited);
        debug!(type_name = shape.name, found, "Scanned type tree for dynamic values");
        self.dynamic_scan.insert(shape.id, found);
        found
    }

    /// One entry per (flattened) source field, in source declaration order.
    ///
    /// Fields pair up by exact matching name. Non-struct shapes yield no pairs.
    pub fn field_pairs(&self, source: &TypeShape, target: &TypeShape) -> Arc<[FieldPair]> {
        let key = (source.id, target.id);
        if let Some(hit) = self.field_pairs.get(&key) {
            return Arc::clone(hit.value());
        }
        let pairs = compute_field_pairs(source, target);
        debug!(
            source = source.name,
            target = target.name,
            fields = pairs.len(),
            "Cached field index paths"
        );
        self.field_pairs.insert(key, Arc::clone(&pairs));
        pairs
    }

    /// Number of types with a cached scan result.
    pub fn scanned_types(&self) -> usize {
        self.dynamic_scan.len()
    }

    /// Number of cached (source, destination) field mappings.
    pub fn cached_pairs(&self) -> usize {
        self.field_pairs.len()
    }
}

fn scan_for_dynamic(shape: &TypeShape, visited: &mut HashSet<TypeId>) -> bool {
    if !visited.insert(shape.id) {
        return false;
    }
    match shape.kind {
        ShapeKind::Dynamic => true,
        ShapeKind::Scalar(_) => false,
        ShapeKind::Pointer(elem) | ShapeKind::List(elem) => scan_for_dynamic(&elem(), visited),
        ShapeKind::Struct(fields) => fields
            .iter()
            .any(|field| scan_for_dynamic(&field.shape(), visited)),
    }
}

fn compute_field_pairs(source: &TypeShape, target: &TypeShape) -> Arc<[FieldPair]> {
    let targets = target.leaf_fields();
    source
        .leaf_fields()
        .into_iter()
        .map(|(path, field)| {
            let name = field.match_name();
            let target = targets
                .iter()
                .find(|(_, candidate)| candidate.match_name() == name)
                .map(|(path, _)| path.clone());
            FieldPair {
                name,
                source: path,
                target,
            }
        })
        .collect()
}

//! Shape descriptors for reflected types.
//!
//! A [`TypeShape`] is the runtime description of a Rust type as seen by the
//! conversion engine. Every reflected type falls into exactly one
//! [`ShapeKind`], and the engine dispatches on that tag instead of on open
//! ended type identity.

use std::any::{type_name, TypeId};
use std::fmt;

/// Scalar categories understood by the codec and the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    /// Non-null datetime with a zero sentinel (`0001-01-01 00:00:00`)
    Timestamp,
    /// Nullable datetime
    NullTime,
    /// Raw JSON document bytes
    JsonBytes,
}

/// Shape kind enumeration.
#[derive(Debug, Clone, Copy)]
pub enum ShapeKind {
    /// Leaf value.
    Scalar(ScalarKind),
    /// Struct with named fields, in declaration order.
    Struct(&'static [FieldShape]),
    /// Nullable owning pointer (`Option<Box<T>>`).
    Pointer(fn() -> TypeShape),
    /// Growable list (`Vec<T>` or nil-able `Option<Vec<T>>`).
    List(fn() -> TypeShape),
    /// Dynamic value node (`DynamicValue` or `Option<DynamicValue>`).
    Dynamic,
}

/// A complete shape descriptor.
#[derive(Clone, Copy)]
pub struct TypeShape {
    /// Identity of the described type.
    pub id: TypeId,
    /// Type name, for diagnostics only.
    pub name: &'static str,
    /// Shape kind.
    pub kind: ShapeKind,
}

impl TypeShape {
    /// Create a shape for `T`.
    pub fn new<T: 'static>(kind: ShapeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
        }
    }

    /// Check if this is a struct shape.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, ShapeKind::Struct(_))
    }

    /// Check if this is a pointer shape.
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, ShapeKind::Pointer(_))
    }

    /// Check if this is a list shape.
    pub fn is_list(&self) -> bool {
        matches!(self.kind, ShapeKind::List(_))
    }

    /// Check if this is exactly a dynamic value node.
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, ShapeKind::Dynamic)
    }

    /// Check if this is a list whose elements are dynamic value nodes.
    pub fn is_dynamic_list(&self) -> bool {
        match self.kind {
            ShapeKind::List(elem) => elem().is_dynamic(),
            _ => false,
        }
    }

    /// Check if this is a struct or a pointer to a struct.
    pub fn is_struct_like(&self) -> bool {
        match self.kind {
            ShapeKind::Struct(_) => true,
            ShapeKind::Pointer(elem) => elem().is_struct(),
            _ => false,
        }
    }

    /// Element shape of a pointer or list.
    pub fn elem(&self) -> Option<TypeShape> {
        match self.kind {
            ShapeKind::Pointer(elem) | ShapeKind::List(elem) => Some(elem()),
            _ => None,
        }
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> Option<&'static [FieldShape]> {
        match self.kind {
            ShapeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get a direct field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldShape> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// All fields with flattened structs expanded, paired with their index
    /// path from this struct.
    ///
    /// Direct fields come before promoted ones, so a shallower field wins a
    /// name collision for callers that keep the first match.
    pub fn leaf_fields(&self) -> Vec<(Vec<usize>, &'static FieldShape)> {
        let mut out = Vec::new();
        let mut pending: Vec<(Vec<usize>, TypeShape)> = vec![(Vec::new(), *self)];
        while !pending.is_empty() {
            let mut next = Vec::new();
            for (prefix, shape) in pending {
                let Some(fields) = shape.fields() else {
                    continue;
                };
                for (i, field) in fields.iter().enumerate() {
                    let mut path = prefix.clone();
                    path.push(i);
                    let field_shape = field.shape();
                    if field.flatten && field_shape.is_struct() {
                        next.push((path, field_shape));
                    } else {
                        out.push((path, field));
                    }
                }
            }
            pending = next;
        }
        out
    }
}

impl PartialEq for TypeShape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeShape {}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeShape")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Field descriptor within a struct shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    /// Rust field name.
    pub name: &'static str,
    /// JSON key; `"-"` excludes the field from encoding.
    pub json: &'static str,
    /// Name used for source/destination matching instead of `name`.
    pub copy_name: Option<&'static str>,
    /// Embedded struct whose fields are promoted into the parent.
    pub flatten: bool,
    /// Lazily resolved field type shape.
    pub shape: fn() -> TypeShape,
}

impl FieldShape {
    /// Name used when pairing source and destination fields.
    pub fn match_name(&self) -> &'static str {
        self.copy_name.unwrap_or(self.name)
    }

    /// Whether the encoder skips this field.
    pub fn skips_json(&self) -> bool {
        self.json == "-"
    }

    /// Resolve the field type shape.
    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }
}

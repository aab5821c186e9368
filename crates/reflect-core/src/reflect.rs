//! Object-safe reflection over values.
//!
//! [`Reflect`] is implemented for scalars, owning pointers, lists, dynamic
//! values and (through [`impl_reflect_struct!`](crate::impl_reflect_struct))
//! user structs. Callers inspect a value with [`Reflect::reflect_ref`] and
//! mutate it with [`Reflect::reflect_mut`], both of which expose one view per
//! [`ShapeKind`](crate::ShapeKind).

use std::any::Any;

use crate::error::ReflectError;
use crate::shape::{FieldShape, TypeShape};
use crate::values::DynamicValue;

/// A value whose shape can be inspected and rewritten at runtime.
pub trait Reflect: Any + Send + Sync {
    /// Static shape of the implementing type.
    fn shape() -> TypeShape
    where
        Self: Sized;

    /// Shape of this value's type.
    fn type_shape(&self) -> TypeShape;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Independent deep copy of this value.
    fn clone_value(&self) -> Box<dyn Reflect>;

    /// Move `value` into `self` if it has the same type; hands it back otherwise.
    fn assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Whether this value equals its type's zero value.
    fn is_zero(&self) -> bool;

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;
}

/// Read-only view of a reflected value.
pub enum ReflectRef<'a> {
    Scalar(&'a dyn ReflectScalar),
    Struct(&'a dyn ReflectStruct),
    /// Pointee, or `None` for a nil pointer.
    Pointer(Option<&'a dyn Reflect>),
    List(&'a dyn ReflectList),
    /// Dynamic value, or `None` when unset.
    Dynamic(Option<&'a DynamicValue>),
}

/// Mutable view of a reflected value.
pub enum ReflectMut<'a> {
    Scalar(&'a mut dyn ReflectScalar),
    Struct(&'a mut dyn ReflectStruct),
    Pointer(&'a mut dyn ReflectPointer),
    List(&'a mut dyn ReflectList),
    Dynamic(DynamicMut<'a>),
}

/// Leaf values that map directly onto JSON.
pub trait ReflectScalar {
    fn to_json(&self) -> Result<serde_json::Value, ReflectError>;

    /// Overwrite from a JSON value. `null` leaves the value untouched.
    fn set_json(&mut self, value: &serde_json::Value, weak: bool) -> Result<(), ReflectError>;
}

/// Field access for reflected structs.
pub trait ReflectStruct {
    fn fields(&self) -> &'static [FieldShape];

    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Element access for reflected lists.
pub trait ReflectList {
    fn elem_shape(&self) -> TypeShape;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nil lists only exist for `Option<Vec<T>>`.
    fn is_nil(&self) -> bool;

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Make the list empty and non-nil.
    fn clear(&mut self);

    /// Make the list nil (or empty when the type cannot be nil).
    fn set_nil(&mut self);

    /// Append a default element and return it for in-place population.
    fn push_default(&mut self) -> &mut dyn Reflect;
}

/// Owning nullable pointer access.
pub trait ReflectPointer {
    fn elem_shape(&self) -> TypeShape;

    fn get(&self) -> Option<&dyn Reflect>;

    fn get_mut(&mut self) -> Option<&mut dyn Reflect>;

    fn get_or_insert_default(&mut self) -> &mut dyn Reflect;

    /// Replace the pointee with a freshly allocated default value.
    fn reset(&mut self) -> &mut dyn Reflect;

    fn set_nil(&mut self);
}

/// Mutable slot holding a dynamic value.
pub enum DynamicMut<'a> {
    Value(&'a mut DynamicValue),
    Nullable(&'a mut Option<DynamicValue>),
}

impl DynamicMut<'_> {
    pub fn get(&self) -> Option<&DynamicValue> {
        match self {
            Self::Value(v) => Some(&**v),
            Self::Nullable(v) => v.as_ref(),
        }
    }

    /// Store `value`; clearing a non-nullable slot leaves an empty object.
    pub fn set(self, value: Option<DynamicValue>) {
        match self {
            Self::Value(v) => *v = value.unwrap_or_default(),
            Self::Nullable(v) => *v = value,
        }
    }
}

/// Resolve a field index path (through flattened structs) for reading.
pub fn field_by_path<'a>(value: &'a dyn ReflectStruct, path: &[usize]) -> Option<&'a dyn Reflect> {
    let (first, rest) = path.split_first()?;
    let field = value.field_at(*first)?;
    if rest.is_empty() {
        return Some(field);
    }
    match field.reflect_ref() {
        ReflectRef::Struct(inner) => field_by_path(inner, rest),
        _ => None,
    }
}

/// Resolve a field index path (through flattened structs) for writing.
pub fn field_by_path_mut<'a>(
    value: &'a mut dyn ReflectStruct,
    path: &[usize],
) -> Option<&'a mut dyn Reflect> {
    let (first, rest) = path.split_first()?;
    let field = value.field_at_mut(*first)?;
    if rest.is_empty() {
        return Some(field);
    }
    match field.reflect_mut() {
        ReflectMut::Struct(inner) => field_by_path_mut(inner, rest),
        _ => None,
    }
}

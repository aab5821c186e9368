//! Conversion engine.
//!
//! [`Copier::shallow_copy`] copies a source value into a destination value of
//! a possibly different type, one field at a time:
//!
//! 1. fields pair up by matching name (flattened structs promote their fields)
//! 2. identical types are cloned
//! 3. a registered converter handles an exact type pair
//! 4. structs, pointers and lists of copyable elements recurse
//! 5. anything else is skipped, or rejected when `strict` is set
//!
//! Pairs that involve dynamic values are left to [`Copier::bridge`], which
//! [`Copier::convert`] runs after the field copy.

use std::sync::{Arc, OnceLock};

use reflect_core::{
    field_by_path, field_by_path_mut, Reflect, ReflectMut, ReflectRef, ReflectStruct, TypeShape,
};
use tracing::trace;

use crate::bridge;
use crate::cache::MetadataCache;
use crate::error::{ConvertError, Result};
use crate::options::CopyOptions;
use crate::registry::{ConverterRegistry, TypeConverter};

static GLOBAL: OnceLock<Copier> = OnceLock::new();

/// How a (destination, source) type pair is copied.
#[derive(Debug, Clone, Copy)]
enum Plan<'r> {
    /// Same type; clone the source.
    Assign,
    /// Run a registered converter.
    Convert(&'r TypeConverter),
    /// Struct or pointer-to-struct on both sides; copy field by field.
    Struct,
    /// One or both sides are pointers around a copyable pair.
    Deref,
    /// Lists with copyable elements; rebuild element by element.
    List,
    /// Dynamic values of different nullability.
    Dynamic,
    /// Dynamic value on either side; handled by the bridge pass.
    Bridge,
    /// Nothing applies.
    Mismatch,
}

/// Conversion engine owning its converter registry and metadata cache.
///
/// `Copier` is cheap to clone; clones share the registry and the cache.
#[derive(Debug, Clone)]
pub struct Copier {
    registry: Arc<ConverterRegistry>,
    cache: Arc<MetadataCache>,
}

impl Default for Copier {
    fn default() -> Self {
        Self::new(ConverterRegistry::with_defaults())
    }
}

impl Copier {
    /// Create a copier over `registry` with a fresh metadata cache.
    pub fn new(registry: ConverterRegistry) -> Self {
        Self::with_cache(Arc::new(registry), Arc::new(MetadataCache::new()))
    }

    /// Create a copier sharing an existing registry and cache.
    pub fn with_cache(registry: Arc<ConverterRegistry>, cache: Arc<MetadataCache>) -> Self {
        Self { registry, cache }
    }

    /// Process-wide copier with the built-in converters, created on first use.
    pub fn global() -> &'static Copier {
        GLOBAL.get_or_init(Copier::default)
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Copy `src` into `dst`, then bridge any dynamic values the field copy
    /// left behind.
    ///
    /// On error `dst` keeps whatever was copied before the failing field.
    pub fn convert(
        &self,
        dst: &mut dyn Reflect,
        src: &dyn Reflect,
        options: &CopyOptions,
    ) -> Result<()> {
        self.shallow_copy(dst, src, options)?;
        self.bridge(dst, src)
    }

    /// Field-by-field copy without the dynamic value pass.
    pub fn shallow_copy(
        &self,
        dst: &mut dyn Reflect,
        src: &dyn Reflect,
        options: &CopyOptions,
    ) -> Result<()> {
        self.copy_value(dst, src, options, "")
    }

    /// Run only the dynamic value pass.
    pub fn bridge(&self, dst: &mut dyn Reflect, src: &dyn Reflect) -> Result<()> {
        bridge::run(&self.cache, dst, src)
    }

    fn plan(&self, dst: &TypeShape, src: &TypeShape) -> Plan<'_> {
        if dst == src {
            return Plan::Assign;
        }
        if let Some(converter) = self.registry.find(src, dst) {
            return Plan::Convert(converter);
        }
        if dst.is_dynamic() && src.is_dynamic() {
            return Plan::Dynamic;
        }
        if bridge::handles_field(dst, src) {
            return Plan::Bridge;
        }
        if dst.is_struct_like() && src.is_struct_like() {
            return Plan::Struct;
        }
        if let (Some(dst_elem), Some(src_elem)) = (list_elem(dst), list_elem(src)) {
            return match self.plan(&dst_elem, &src_elem) {
                Plan::Mismatch | Plan::Bridge => Plan::Mismatch,
                _ => Plan::List,
            };
        }
        let dst_inner = pointer_elem(dst).unwrap_or(*dst);
        let src_inner = pointer_elem(src).unwrap_or(*src);
        if (dst.is_pointer() || src.is_pointer())
            && !matches!(self.plan(&dst_inner, &src_inner), Plan::Mismatch | Plan::Bridge)
        {
            return Plan::Deref;
        }
        Plan::Mismatch
    }

    fn copy_value(
        &self,
        dst: &mut dyn Reflect,
        src: &dyn Reflect,
        options: &CopyOptions,
        field: &str,
    ) -> Result<()> {
        let dst_shape = dst.type_shape();
        let src_shape = src.type_shape();
        match self.plan(&dst_shape, &src_shape) {
            Plan::Assign => {
                // Same type, so the assignment cannot be rejected.
                let _ = dst.assign(src.clone_value());
                Ok(())
            }
            Plan::Convert(converter) => apply_converter(converter, dst, src, field),
            Plan::Struct => self.copy_struct_like(dst, src, options, field),
            Plan::Deref => self.copy_through_pointer(dst, src, options, field),
            Plan::List => self.copy_list(dst, src, options, field),
            Plan::Dynamic => {
                if let (ReflectRef::Dynamic(value), ReflectMut::Dynamic(slot)) =
                    (src.reflect_ref(), dst.reflect_mut())
                {
                    slot.set(value.cloned());
                }
                Ok(())
            }
            Plan::Bridge => {
                trace!(
                    field,
                    from = src_shape.name,
                    to = dst_shape.name,
                    "Deferring field to bridge pass"
                );
                Ok(())
            }
            Plan::Mismatch if options.strict => Err(ConvertError::TypeMismatch {
                field: field.to_string(),
                from: src_shape.name,
                to: dst_shape.name,
            }),
            Plan::Mismatch => {
                trace!(
                    field,
                    from = src_shape.name,
                    to = dst_shape.name,
                    "Skipping incompatible field"
                );
                Ok(())
            }
        }
    }

    fn copy_struct_like(
        &self,
        dst: &mut dyn Reflect,
        src: &dyn Reflect,
        options: &CopyOptions,
        field: &str,
    ) -> Result<()> {
        let src_shape = struct_shape(&src.type_shape());
        let dst_shape = struct_shape(&dst.type_shape());
        let source = match src.reflect_ref() {
            ReflectRef::Struct(s) => s,
            ReflectRef::Pointer(Some(inner)) => match inner.reflect_ref() {
                ReflectRef::Struct(s) => s,
                _ => return Ok(()),
            },
            ReflectRef::Pointer(None) => {
                if let ReflectMut::Pointer(p) = dst.reflect_mut() {
                    p.set_nil();
                }
                return Ok(());
            }
            _ => return Ok(()),
        };
        let target = match dst.reflect_mut() {
            ReflectMut::Struct(d) => d,
            ReflectMut::Pointer(p) => match p.get_or_insert_default().reflect_mut() {
                ReflectMut::Struct(d) => d,
                _ => return Ok(()),
            },
            _ => return Ok(()),
        };
        self.copy_fields(target, source, &dst_shape, &src_shape, options, field)
    }

    fn copy_fields(
        &self,
        dst: &mut dyn ReflectStruct,
        src: &dyn ReflectStruct,
        dst_shape: &TypeShape,
        src_shape: &TypeShape,
        options: &CopyOptions,
        prefix: &str,
    ) -> Result<()> {
        let pairs = self.cache.field_pairs(src_shape, dst_shape);
        for pair in pairs.iter() {
            let Some(target_path) = &pair.target else {
                continue;
            };
            let Some(source) = field_by_path(src, &pair.source) else {
                continue;
            };
            if options.ignore_empty && source.is_zero() {
                continue;
            }
            let Some(target) = field_by_path_mut(dst, target_path) else {
                continue;
            };
            self.copy_value(target, source, options, &join(prefix, pair.name))?;
        }
        Ok(())
    }

    fn copy_through_pointer(
        &self,
        dst: &mut dyn Reflect,
        src: &dyn Reflect,
        options: &CopyOptions,
        field: &str,
    ) -> Result<()> {
        let source = match src.reflect_ref() {
            ReflectRef::Pointer(Some(inner)) => inner,
            ReflectRef::Pointer(None) => {
                if let ReflectMut::Pointer(p) = dst.reflect_mut() {
                    p.set_nil();
                }
                return Ok(());
            }
            _ => src,
        };
        if dst.type_shape().is_pointer() {
            if let ReflectMut::Pointer(p) = dst.reflect_mut() {
                return self.copy_value(p.get_or_insert_default(), source, options, field);
            }
            return Ok(());
        }
        self.copy_value(dst, source, options, field)
    }

    fn copy_list(
        &self,
        dst: &mut dyn Reflect,
        src: &dyn Reflect,
        options: &CopyOptions,
        field: &str,
    ) -> Result<()> {
        let (ReflectRef::List(source), ReflectMut::List(target)) =
            (src.reflect_ref(), dst.reflect_mut())
        else {
            return Ok(());
        };
        if source.is_nil() {
            target.set_nil();
            return Ok(());
        }
        target.clear();
        for i in 0..source.len() {
            let Some(item) = source.get(i) else {
                continue;
            };
            self.copy_value(target.push_default(), item, options, &format!("{field}[{i}]"))?;
        }
        Ok(())
    }
}

/// Copy `src` into `dst` with the process-wide [`Copier`].
pub fn convert(dst: &mut dyn Reflect, src: &dyn Reflect, options: &CopyOptions) -> Result<()> {
    Copier::global().convert(dst, src, options)
}

/// Copy `src` into `dst` with an explicit [`Copier`].
pub fn convert_with(
    copier: &Copier,
    dst: &mut dyn Reflect,
    src: &dyn Reflect,
    options: &CopyOptions,
) -> Result<()> {
    copier.convert(dst, src, options)
}

fn apply_converter(
    converter: &TypeConverter,
    dst: &mut dyn Reflect,
    src: &dyn Reflect,
    field: &str,
) -> Result<()> {
    let output = converter.convert(src).map_err(|source| {
        let malformed = source
            .downcast_ref::<json_types::JsonTypesError>()
            .is_some_and(|e| e.is_malformed());
        if malformed {
            ConvertError::malformed(field, source)
        } else {
            ConvertError::Converter {
                field: field.to_string(),
                from: converter.source().name,
                to: converter.target().name,
                source,
            }
        }
    })?;
    dst.assign(output).map_err(|_| ConvertError::ConverterOutput {
        from: converter.source().name,
        to: converter.target().name,
    })
}

/// The struct behind a pointer-to-struct, or the shape itself.
fn struct_shape(shape: &TypeShape) -> TypeShape {
    match pointer_elem(shape) {
        Some(elem) if elem.is_struct() => elem,
        _ => *shape,
    }
}

fn pointer_elem(shape: &TypeShape) -> Option<TypeShape> {
    shape.is_pointer().then(|| shape.elem()).flatten()
}

fn list_elem(shape: &TypeShape) -> Option<TypeShape> {
    shape.is_list().then(|| shape.elem()).flatten()
}

pub(crate) fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

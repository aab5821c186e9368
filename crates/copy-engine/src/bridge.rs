//! Dynamic value bridge.
//!
//! The field copy only converts dynamic values through exact type pairs in
//! the registry. This pass finds the remaining dynamic values, at any depth,
//! and converts them to and from statically typed values.
//!
//! Root-level cases, checked first:
//!
//! - a. dynamic value → struct: decode (weakly typed)
//! - b. struct → dynamic value: encode
//! - c. dynamic value list → list: decode each non-null element (weakly typed)
//! - d. list → dynamic value list: encode each struct element
//!
//! Otherwise both roots must be structs, or both lists, whose type trees
//! contain a dynamic value. Two lists are bridged element-wise as in rule 5.
//! Matched field pairs are handled by the first rule that applies:
//!
//! 1. dynamic value → pointer or struct: decode
//! 2. non-empty dynamic value list → other list: decode each non-null element
//! 3. struct or pointer-to-struct → dynamic value: encode
//! 4. any list → dynamic value list: JSON round trip
//! 5. struct/struct, non-nil pointer/pointer, and equal-length lists: recurse
//!
//! Lists of different lengths in rule 5 are skipped.

use reflect_core::{
    decode_into, encode, field_by_path, field_by_path_mut, DecodeOptions, DynamicValue, Reflect,
    ReflectList, ReflectMut, ReflectRef, ReflectStruct, TypeShape,
};
use serde_json::Value;
use tracing::trace;

use crate::cache::MetadataCache;
use crate::engine::join;
use crate::error::{ConvertError, Result};

/// Whether a matched field pair falls under one of the conversion rules 1-4.
pub(crate) fn handles_field(dst: &TypeShape, src: &TypeShape) -> bool {
    (src.is_dynamic() && (dst.is_pointer() || dst.is_struct()))
        || (src.is_dynamic_list() && dst.is_list() && !dst.is_dynamic_list())
        || (dst.is_dynamic() && src.is_struct_like())
        || (dst.is_dynamic_list() && src.is_list())
}

/// Whether the bridge has anything to do for this pair of roots.
pub(crate) fn should_bridge(cache: &MetadataCache, dst: &TypeShape, src: &TypeShape) -> bool {
    if src.is_dynamic() && dst.is_struct_like() {
        return true;
    }
    if dst.is_dynamic() && src.is_struct_like() {
        return true;
    }
    if src.is_dynamic_list() && dst.is_list() {
        return true;
    }
    if dst.is_dynamic_list() && src.is_list() && !src.is_dynamic_list() {
        return true;
    }
    let structs = dst.is_struct_like() && src.is_struct_like();
    let lists = dst.is_list() && src.is_list();
    if !structs && !lists {
        return false;
    }
    cache.contains_dynamic(dst) || cache.contains_dynamic(src)
}

/// Run the bridge pass over two roots.
pub(crate) fn run(cache: &MetadataCache, dst: &mut dyn Reflect, src: &dyn Reflect) -> Result<()> {
    let dst_shape = dst.type_shape();
    let src_shape = src.type_shape();
    if !should_bridge(cache, &dst_shape, &src_shape) {
        return Ok(());
    }
    trace!(from = src_shape.name, to = dst_shape.name, "Running bridge pass");

    if src_shape.is_dynamic() && dst_shape.is_struct_like() {
        return decode_root(dst, src);
    }
    if dst_shape.is_dynamic() && src_shape.is_struct_like() {
        return encode_into_dynamic(dst, src, "");
    }
    if src_shape.is_dynamic_list() && dst_shape.is_list() {
        return decode_root_list(dst, src);
    }
    if dst_shape.is_dynamic_list() && src_shape.is_list() {
        return encode_root_list(dst, src);
    }
    if dst_shape.is_list() && src_shape.is_list() {
        return bridge_field(cache, dst, src, "");
    }
    walk(cache, dst, src, "")
}

/// Case a.
fn decode_root(dst: &mut dyn Reflect, src: &dyn Reflect) -> Result<()> {
    let ReflectRef::Dynamic(Some(value)) = src.reflect_ref() else {
        return Ok(());
    };
    let target: &mut dyn Reflect = if dst.type_shape().is_pointer() {
        match dst.reflect_mut() {
            ReflectMut::Pointer(p) => p.get_or_insert_default(),
            _ => return Ok(()),
        }
    } else {
        dst
    };
    decode_into(target, &value.to_value(), &DecodeOptions::weak())
        .map_err(|e| ConvertError::malformed("", e))
}

/// Case c.
fn decode_root_list(dst: &mut dyn Reflect, src: &dyn Reflect) -> Result<()> {
    let (ReflectRef::List(source), ReflectMut::List(target)) =
        (src.reflect_ref(), dst.reflect_mut())
    else {
        return Ok(());
    };
    decode_list(target, source, &DecodeOptions::weak(), "")
}

/// Case d.
fn encode_root_list(dst: &mut dyn Reflect, src: &dyn Reflect) -> Result<()> {
    let (ReflectRef::List(source), ReflectMut::List(target)) =
        (src.reflect_ref(), dst.reflect_mut())
    else {
        return Ok(());
    };
    target.clear();
    for i in 0..source.len() {
        let Some(item) = source.get(i) else {
            continue;
        };
        let element = match item.reflect_ref() {
            ReflectRef::Struct(_) => item,
            ReflectRef::Pointer(Some(inner)) if inner.type_shape().is_struct() => inner,
            _ => continue,
        };
        let field = format!("[{i}]");
        let dv = encode_dynamic(element, &field)?;
        if let ReflectMut::Dynamic(slot) = target.push_default().reflect_mut() {
            slot.set(Some(dv));
        }
    }
    Ok(())
}

/// Generic pass over two struct (or non-nil pointer-to-struct) values.
fn walk(
    cache: &MetadataCache,
    dst: &mut dyn Reflect,
    src: &dyn Reflect,
    prefix: &str,
) -> Result<()> {
    let Some((source, src_shape)) = struct_view(src) else {
        return Ok(());
    };
    let dst_shape = match dst.reflect_ref() {
        ReflectRef::Struct(_) => dst.type_shape(),
        ReflectRef::Pointer(Some(inner)) if inner.type_shape().is_struct() => inner.type_shape(),
        _ => return Ok(()),
    };
    let target: &mut dyn ReflectStruct = match dst.reflect_mut() {
        ReflectMut::Struct(d) => d,
        ReflectMut::Pointer(p) => match p.get_mut().map(|inner| inner.reflect_mut()) {
            Some(ReflectMut::Struct(d)) => d,
            _ => return Ok(()),
        },
        _ => return Ok(()),
    };

    let pairs = cache.field_pairs(&src_shape, &dst_shape);
    for pair in pairs.iter() {
        let Some(target_path) = &pair.target else {
            continue;
        };
        let Some(from) = field_by_path(source, &pair.source) else {
            continue;
        };
        let Some(to) = field_by_path_mut(target, target_path) else {
            continue;
        };
        bridge_field(cache, to, from, &join(prefix, pair.name))?;
    }
    Ok(())
}

fn bridge_field(
    cache: &MetadataCache,
    to: &mut dyn Reflect,
    from: &dyn Reflect,
    field: &str,
) -> Result<()> {
    let to_shape = to.type_shape();
    let from_shape = from.type_shape();

    // 1. dynamic value → pointer or struct
    if from_shape.is_dynamic() && (to_shape.is_pointer() || to_shape.is_struct()) {
        let ReflectRef::Dynamic(Some(value)) = from.reflect_ref() else {
            return Ok(());
        };
        trace!(field, to = to_shape.name, "Decoding dynamic value field");
        let target: &mut dyn Reflect = if to_shape.is_pointer() {
            match to.reflect_mut() {
                ReflectMut::Pointer(p) => p.reset(),
                _ => return Ok(()),
            }
        } else {
            to
        };
        return decode_into(target, &value.to_value(), &DecodeOptions::strict())
            .map_err(|e| ConvertError::malformed(field, e));
    }

    // 2. dynamic value list → other list
    if from_shape.is_dynamic_list() && to_shape.is_list() && !to_shape.is_dynamic_list() {
        let (ReflectRef::List(source), ReflectMut::List(target)) =
            (from.reflect_ref(), to.reflect_mut())
        else {
            return Ok(());
        };
        if source.is_empty() {
            return Ok(());
        }
        trace!(field, to = to_shape.name, "Decoding dynamic value list field");
        return decode_list(target, source, &DecodeOptions::strict(), field);
    }

    // 3. struct or pointer-to-struct → dynamic value
    if to_shape.is_dynamic() {
        if !from_shape.is_struct_like() {
            return Ok(());
        }
        let element = match from.reflect_ref() {
            ReflectRef::Pointer(None) => return Ok(()),
            ReflectRef::Pointer(Some(inner)) => inner,
            _ => from,
        };
        trace!(field, from = from_shape.name, "Encoding struct field into dynamic value");
        return encode_into_dynamic(to, element, field);
    }

    // 4. any list → dynamic value list
    if to_shape.is_dynamic_list() && from_shape.is_list() {
        let encoded = encode(from).map_err(|e| ConvertError::encoding(field, e))?;
        return decode_into(to, &encoded, &DecodeOptions::strict())
            .map_err(|e| ConvertError::malformed(field, e));
    }

    // 5. recurse
    match from.reflect_ref() {
        ReflectRef::Struct(_) if to_shape.is_struct() => walk(cache, to, from, field),
        // A nil destination pointer is left alone.
        ReflectRef::Pointer(Some(_)) if to_shape.is_pointer() => walk(cache, to, from, field),
        ReflectRef::List(source) if to_shape.is_list() => {
            let ReflectMut::List(target) = to.reflect_mut() else {
                return Ok(());
            };
            if source.len() != target.len() {
                trace!(
                    field,
                    from_len = source.len(),
                    to_len = target.len(),
                    "Skipping list recursion on length mismatch"
                );
                return Ok(());
            }
            for i in 0..source.len() {
                let (Some(from_item), Some(to_item)) = (source.get(i), target.get_mut(i)) else {
                    continue;
                };
                let (from_shape, to_shape) = (from_item.type_shape(), to_item.type_shape());
                let pointers = from_shape.is_pointer() && to_shape.is_pointer();
                let structs = from_shape.is_struct() && to_shape.is_struct();
                if pointers || structs {
                    walk(cache, to_item, from_item, &format!("{field}[{i}]"))?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Rebuild `target` from the non-null elements of a dynamic value list.
fn decode_list(
    target: &mut dyn ReflectList,
    source: &dyn ReflectList,
    options: &DecodeOptions,
    field: &str,
) -> Result<()> {
    target.clear();
    for i in 0..source.len() {
        let Some(item) = source.get(i) else {
            continue;
        };
        let ReflectRef::Dynamic(Some(value)) = item.reflect_ref() else {
            continue;
        };
        decode_into(target.push_default(), &value.to_value(), options)
            .map_err(|e| ConvertError::malformed(&format!("{field}[{i}]"), e))?;
    }
    Ok(())
}

/// Encode a struct value and store it in a dynamic value slot.
fn encode_into_dynamic(to: &mut dyn Reflect, from: &dyn Reflect, field: &str) -> Result<()> {
    let source = match from.reflect_ref() {
        ReflectRef::Pointer(None) => return Ok(()),
        ReflectRef::Pointer(Some(inner)) => inner,
        _ => from,
    };
    let dv = encode_dynamic(source, field)?;
    if let ReflectMut::Dynamic(slot) = to.reflect_mut() {
        slot.set(Some(dv));
    }
    Ok(())
}

fn encode_dynamic(value: &dyn Reflect, field: &str) -> Result<DynamicValue> {
    match encode(value).map_err(|e| ConvertError::encoding(field, e))? {
        Value::Object(map) => Ok(DynamicValue::from(map)),
        other => Err(ConvertError::malformed(
            field,
            format!("expected an object, found {}", reflect_core::error::json_kind(&other)),
        )),
    }
}

/// Struct view and shape of a struct or non-nil pointer-to-struct.
fn struct_view(value: &dyn Reflect) -> Option<(&dyn ReflectStruct, TypeShape)> {
    match value.reflect_ref() {
        ReflectRef::Struct(s) => Some((s, value.type_shape())),
        ReflectRef::Pointer(Some(inner)) => match inner.reflect_ref() {
            ReflectRef::Struct(s) => Some((s, inner.type_shape())),
            _ => None,
        },
        _ => None,
    }
}

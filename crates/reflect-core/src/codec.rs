//! Shape-driven JSON encoding and decoding.
//!
//! [`encode`] renders any reflected value as a JSON tree keyed by the
//! fields' JSON names. [`decode_into`] writes a JSON tree back into an
//! existing value, matching keys against JSON names first and then
//! case-insensitively against JSON and field names. Unknown keys are ignored.

use serde_json::{Map, Value};

use crate::error::ReflectError;
use crate::reflect::{field_by_path_mut, Reflect, ReflectMut, ReflectRef, ReflectStruct};
use crate::shape::{FieldShape, TypeShape};

/// Options for [`decode_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Allow string/number/bool coercions and single values into lists.
    pub weakly_typed: bool,
}

impl DecodeOptions {
    /// Strict decoding; JSON kinds must match the target shape.
    pub fn strict() -> Self {
        Self { weakly_typed: false }
    }

    /// Lenient decoding with scalar coercions.
    pub fn weak() -> Self {
        Self { weakly_typed: true }
    }
}

/// Encode a reflected value as JSON.
pub fn encode(value: &dyn Reflect) -> Result<Value, ReflectError> {
    match value.reflect_ref() {
        ReflectRef::Scalar(s) => s.to_json(),
        ReflectRef::Struct(s) => {
            let mut map = Map::new();
            encode_struct(s, &mut map)?;
            Ok(Value::Object(map))
        }
        ReflectRef::Pointer(None) => Ok(Value::Null),
        ReflectRef::Pointer(Some(inner)) => encode(inner),
        ReflectRef::List(list) if list.is_nil() => Ok(Value::Null),
        ReflectRef::List(list) => {
            let mut items = Vec::with_capacity(list.len());
            for i in 0..list.len() {
                if let Some(item) = list.get(i) {
                    items.push(encode(item).map_err(|e| e.within(&format!("[{i}]")))?);
                }
            }
            Ok(Value::Array(items))
        }
        ReflectRef::Dynamic(None) => Ok(Value::Null),
        ReflectRef::Dynamic(Some(dv)) => Ok(dv.to_value()),
    }
}

fn encode_struct(
    value: &dyn ReflectStruct,
    map: &mut Map<String, Value>,
) -> Result<(), ReflectError> {
    for (i, field) in value.fields().iter().enumerate() {
        if field.skips_json() {
            continue;
        }
        let Some(inner) = value.field_at(i) else {
            continue;
        };
        if field.flatten {
            if let ReflectRef::Struct(embedded) = inner.reflect_ref() {
                encode_struct(embedded, map)?;
                continue;
            }
        }
        let encoded = encode(inner).map_err(|e| e.within(field.json))?;
        map.insert(field.json.to_string(), encoded);
    }
    Ok(())
}

/// Decode `value` into `target`, keeping fields the JSON does not mention.
pub fn decode_into(
    target: &mut dyn Reflect,
    value: &Value,
    options: &DecodeOptions,
) -> Result<(), ReflectError> {
    let shape = target.type_shape();
    match target.reflect_mut() {
        ReflectMut::Scalar(s) => s.set_json(value, options.weakly_typed),
        ReflectMut::Struct(s) => match value {
            Value::Null => Ok(()),
            Value::Object(map) => decode_struct(s, &shape, map, options),
            other => Err(ReflectError::unexpected("object", other)),
        },
        ReflectMut::Pointer(p) => match value {
            Value::Null => {
                p.set_nil();
                Ok(())
            }
            other => decode_into(p.get_or_insert_default(), other, options),
        },
        ReflectMut::List(list) => match value {
            Value::Null => {
                list.set_nil();
                Ok(())
            }
            Value::Array(items) => {
                list.clear();
                for (i, item) in items.iter().enumerate() {
                    decode_into(list.push_default(), item, options)
                        .map_err(|e| e.within(&format!("[{i}]")))?;
                }
                Ok(())
            }
            single if options.weakly_typed => {
                list.clear();
                decode_into(list.push_default(), single, options)
            }
            other => Err(ReflectError::unexpected("array", other)),
        },
        ReflectMut::Dynamic(slot) => match value {
            Value::Null => {
                slot.set(None);
                Ok(())
            }
            Value::Object(map) => {
                slot.set(Some(map.clone().into()));
                Ok(())
            }
            other => Err(ReflectError::unexpected("object", other)),
        },
    }
}

fn decode_struct(
    target: &mut dyn ReflectStruct,
    shape: &TypeShape,
    map: &Map<String, Value>,
    options: &DecodeOptions,
) -> Result<(), ReflectError> {
    let leaves = shape.leaf_fields();
    for (key, item) in map {
        let Some((path, _)) = find_field(&leaves, key) else {
            continue;
        };
        if let Some(field) = field_by_path_mut(target, path) {
            decode_into(field, item, options).map_err(|e| e.within(key))?;
        }
    }
    Ok(())
}

fn find_field<'a>(
    leaves: &'a [(Vec<usize>, &'static FieldShape)],
    key: &str,
) -> Option<&'a (Vec<usize>, &'static FieldShape)> {
    let candidates = || leaves.iter().filter(|(_, f)| !f.skips_json());
    candidates().find(|(_, f)| f.json == key).or_else(|| {
        candidates()
            .find(|(_, f)| f.json.eq_ignore_ascii_case(key) || f.name.eq_ignore_ascii_case(key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{impl_reflect_struct, DynamicValue, NullTime};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Base {
        create_by: String,
    }

    impl_reflect_struct!(Base { create_by: String => "createBy" });

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Task {
        base: Base,
        name: String,
        priority: i32,
        deleted_at: NullTime,
        secret: String,
        tags: Option<Vec<String>>,
        extra: Option<DynamicValue>,
        parent: Option<Box<Task>>,
    }

    impl_reflect_struct!(Task {
        base: Base [flatten],
        name: String => "name",
        priority: i32 => "priority",
        deleted_at: NullTime => "deletedAt",
        secret: String => "-",
        tags: Option<Vec<String>> => "tags",
        extra: Option<DynamicValue> => "extra",
        parent: Option<Box<Task>> => "parent",
    });

    #[test]
    fn test_encode_flattens_and_skips() {
        let task = Task {
            base: Base {
                create_by: "ops".into(),
            },
            name: "a".into(),
            secret: "hidden".into(),
            ..Default::default()
        };
        let value = encode(&task).unwrap();
        assert_eq!(
            value,
            json!({
                "createBy": "ops",
                "name": "a",
                "priority": 0,
                "deletedAt": null,
                "tags": null,
                "extra": null,
                "parent": null,
            })
        );
    }

    #[test]
    fn test_decode_matches_case_insensitively() {
        let mut task = Task::default();
        let input = json!({"NAME": "b", "Priority": 3, "createby": "svc", "unknown": 1});
        decode_into(&mut task, &input, &DecodeOptions::strict()).unwrap();
        assert_eq!(task.name, "b");
        assert_eq!(task.priority, 3);
        assert_eq!(task.base.create_by, "svc");
    }

    #[test]
    fn test_decode_nested_pointer_and_list() {
        let mut task = Task::default();
        let input = json!({
            "tags": ["x", "y"],
            "extra": {"k": 1},
            "parent": {"name": "root"},
        });
        decode_into(&mut task, &input, &DecodeOptions::strict()).unwrap();
        assert_eq!(task.tags, Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(task.extra.as_ref().and_then(|e| e.get("k")), Some(&json!(1)));
        assert_eq!(task.parent.as_ref().map(|p| p.name.as_str()), Some("root"));
    }

    #[test]
    fn test_decode_null_clears_nullable_slots() {
        let mut task = Task {
            name: "keep".into(),
            tags: Some(vec!["x".into()]),
            extra: Some(DynamicValue::new()),
            ..Default::default()
        };
        let input = json!({"name": null, "tags": null, "extra": null});
        decode_into(&mut task, &input, &DecodeOptions::strict()).unwrap();
        assert_eq!(task.name, "keep");
        assert_eq!(task.tags, None);
        assert_eq!(task.extra, None);
    }

    #[test]
    fn test_weak_decoding_wraps_single_value() {
        let mut task = Task::default();
        let input = json!({"tags": "solo", "priority": "7"});
        assert!(decode_into(&mut task, &input, &DecodeOptions::strict()).is_err());

        let mut task = Task::default();
        decode_into(&mut task, &input, &DecodeOptions::weak()).unwrap();
        assert_eq!(task.tags, Some(vec!["solo".to_string()]));
        assert_eq!(task.priority, 7);
    }

    #[test]
    fn test_decode_error_reports_path() {
        let mut task = Task::default();
        let input = json!({"parent": {"tags": ["ok", 5]}});
        let err = decode_into(&mut task, &input, &DecodeOptions::strict()).unwrap_err();
        assert!(err.to_string().starts_with("parent.tags[1]:"), "{err}");
    }
}

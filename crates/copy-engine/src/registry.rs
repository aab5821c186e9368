//! Converter registry.
//!
//! An ordered list of type converters keyed by the exact (source,
//! destination) type pair. The registry is assembled once and then shared
//! read-only; lookups return the first converter registered for a pair.
//!
//! The built-in families, in registration order:
//!
//! | Family | Pairs |
//! |---|---|
//! | nullable time | `NullTime` ↔ `String` |
//! | string list | `JsonBytes` ↔ `Option<Vec<String>>`, `Vec<String>` |
//! | dynamic value list | `JsonBytes` ↔ `Option<Vec<Option<DynamicValue>>>`, `Vec<Option<DynamicValue>>` |
//! | dynamic value | `JsonBytes` ↔ `Option<DynamicValue>`, `DynamicValue` |
//! | time | `Timestamp` ↔ `String` |

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use json_types::{forward, reverse};
use reflect_core::{DynamicValue, JsonBytes, NullTime, Reflect, Timestamp, TypeShape};
use tracing::debug;

use crate::error::BoxError;

type ConvertFn = dyn Fn(&dyn Reflect) -> Result<Box<dyn Reflect>, BoxError> + Send + Sync;

/// A converter for one ordered (source, destination) type pair.
#[derive(Clone)]
pub struct TypeConverter {
    source: TypeShape,
    target: TypeShape,
    func: Arc<ConvertFn>,
}

impl TypeConverter {
    /// Wrap a strongly typed conversion function.
    pub fn new<S, D, F>(func: F) -> Self
    where
        S: Reflect,
        D: Reflect,
        F: Fn(&S) -> Result<D, BoxError> + Send + Sync + 'static,
    {
        let erased = move |value: &dyn Reflect| -> Result<Box<dyn Reflect>, BoxError> {
            let source = value.as_any().downcast_ref::<S>().ok_or_else(|| {
                BoxError::from(format!(
                    "converter for {} received a value of another type",
                    std::any::type_name::<S>()
                ))
            })?;
            let converted: Box<dyn Reflect> = Box::new(func(source)?);
            Ok(converted)
        };
        Self {
            source: S::shape(),
            target: D::shape(),
            func: Arc::new(erased),
        }
    }

    pub fn source(&self) -> &TypeShape {
        &self.source
    }

    pub fn target(&self) -> &TypeShape {
        &self.target
    }

    /// Run the conversion. The output always has the target type.
    pub fn convert(&self, value: &dyn Reflect) -> Result<Box<dyn Reflect>, BoxError> {
        (self.func)(value)
    }
}

impl fmt::Debug for TypeConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConverter")
            .field("source", &self.source.name)
            .field("target", &self.target.name)
            .finish()
    }
}

/// Ordered converter list with first-match lookup.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    converters: Vec<TypeConverter>,
    first_by_pair: HashMap<(TypeId, TypeId), usize>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in converter families.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register_null_time_converters()
            .register_string_list_converters()
            .register_dynamic_list_converters()
            .register_dynamic_converters()
            .register_time_converters();
        debug!(converters = registry.len(), "Built converter registry");
        registry
    }

    /// Append a converter from `S` to `D`.
    ///
    /// A pair that already has a converter keeps the earlier one.
    pub fn register<S, D, F>(&mut self, func: F) -> &mut Self
    where
        S: Reflect,
        D: Reflect,
        F: Fn(&S) -> Result<D, BoxError> + Send + Sync + 'static,
    {
        self.push(TypeConverter::new(func))
    }

    /// Append an already built converter.
    pub fn push(&mut self, converter: TypeConverter) -> &mut Self {
        let key = (converter.source.id, converter.target.id);
        let index = self.converters.len();
        self.first_by_pair.entry(key).or_insert(index);
        self.converters.push(converter);
        self
    }

    /// The first converter registered for the exact pair.
    pub fn find(&self, source: &TypeShape, target: &TypeShape) -> Option<&TypeConverter> {
        let index = self.first_by_pair.get(&(source.id, target.id))?;
        self.converters.get(*index)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Converters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeConverter> {
        self.converters.iter()
    }

    fn register_null_time_converters(&mut self) -> &mut Self {
        self.register(|value: &NullTime| Ok(forward::null_time_to_string(value)))
            .register(|value: &String| Ok(reverse::string_to_null_time(value)))
    }

    fn register_string_list_converters(&mut self) -> &mut Self {
        self.register(|value: &JsonBytes| Ok(reverse::json_to_string_list(value.as_bytes())?))
            .register(|value: &JsonBytes| {
                Ok(reverse::json_to_string_list(value.as_bytes())?.unwrap_or_default())
            })
            .register(|value: &Option<Vec<String>>| {
                Ok(forward::string_list_to_json(value.as_deref()))
            })
            .register(|value: &Vec<String>| {
                Ok(forward::string_list_to_json(Some(value.as_slice())))
            })
    }

    fn register_dynamic_list_converters(&mut self) -> &mut Self {
        self.register(|value: &JsonBytes| Ok(reverse::json_to_dynamic_list(value.as_bytes())?))
            .register(|value: &JsonBytes| {
                Ok(reverse::json_to_dynamic_list(value.as_bytes())?.unwrap_or_default())
            })
            .register(|value: &Option<Vec<Option<DynamicValue>>>| {
                Ok(forward::dynamic_list_to_json(value.as_deref()))
            })
            .register(|value: &Vec<Option<DynamicValue>>| {
                Ok(forward::dynamic_list_to_json(Some(value.as_slice())))
            })
    }

    fn register_dynamic_converters(&mut self) -> &mut Self {
        self.register(|value: &Option<DynamicValue>| Ok(forward::dynamic_to_json(value.as_ref())))
            .register(|value: &DynamicValue| Ok(forward::dynamic_to_json(Some(value))))
            .register(|value: &JsonBytes| Ok(Some(reverse::json_to_dynamic(value.as_bytes())?)))
            .register(|value: &JsonBytes| Ok(reverse::json_to_dynamic(value.as_bytes())?))
    }

    fn register_time_converters(&mut self) -> &mut Self {
        self.register(|value: &Timestamp| Ok(forward::timestamp_to_string(value)))
            .register(|value: &String| Ok(reverse::string_to_timestamp(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<S: Reflect, D: Reflect + Clone>(registry: &ConverterRegistry, value: S) -> D {
        let converter = registry
            .find(&S::shape(), &D::shape())
            .expect("converter registered");
        let out = converter.convert(&value).expect("conversion succeeds");
        out.as_any().downcast_ref::<D>().cloned().expect("target type")
    }

    #[test]
    fn test_default_registration_order() {
        let registry = ConverterRegistry::with_defaults();
        let pairs: Vec<(&str, &str)> = registry
            .iter()
            .map(|c| (c.source().name, c.target().name))
            .collect();
        assert_eq!(pairs.len(), 16);
        assert!(pairs[0].0.ends_with("NullTime"));
        assert!(pairs[15].1.ends_with("Timestamp"));
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = ConverterRegistry::new();
        registry
            .register(|v: &i64| Ok(format!("first:{v}")))
            .register(|v: &i64| Ok(format!("second:{v}")));
        assert_eq!(registry.len(), 2);
        let out: String = run(&registry, 7i64);
        assert_eq!(out, "first:7");
    }

    #[test]
    fn test_unknown_pair_has_no_converter() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.find(&i64::shape(), &String::shape()).is_none());
        assert!(registry.find(&String::shape(), &String::shape()).is_none());
    }

    #[test]
    fn test_string_list_round_trip_through_registry() {
        let registry = ConverterRegistry::with_defaults();
        let bytes: JsonBytes = run(&registry, Some(vec!["a".to_string()]));
        assert_eq!(bytes.as_bytes(), br#"["a"]"#);
        let back: Option<Vec<String>> = run(&registry, bytes);
        assert_eq!(back, Some(vec!["a".to_string()]));

        let nil: JsonBytes = run(&registry, None::<Vec<String>>);
        assert_eq!(nil.as_bytes(), b"null");
        let back: Option<Vec<String>> = run(&registry, nil);
        assert_eq!(back, None);
    }

    #[test]
    fn test_converter_error_is_returned() {
        let registry = ConverterRegistry::with_defaults();
        let converter = registry
            .find(&JsonBytes::shape(), &Option::<DynamicValue>::shape())
            .unwrap();
        assert!(converter.convert(&JsonBytes::from("[1]")).is_err());
    }

    #[test]
    fn test_converter_rejects_wrong_input_type() {
        let registry = ConverterRegistry::with_defaults();
        let converter = registry
            .find(&NullTime::shape(), &String::shape())
            .unwrap();
        assert!(converter.convert(&5i64).is_err());
    }
}

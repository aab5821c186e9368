//! Value types that carry column and interchange semantics.
//!
//! These types give the data-layer vocabulary (nullable datetimes, raw JSON
//! columns, loosely-typed objects) a concrete Rust representation so the
//! converter registry can key on their exact type identity.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{json_kind, ReflectError};

/// Loosely-typed JSON object.
///
/// `DynamicValue` is the interchange format between statically-typed domain
/// structs and semi-structured data. It always holds an object; arrays and
/// scalars only appear nested inside it.
///
/// Integral floats are stored as integers, so `2.0` encodes as `2`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DynamicValue(Map<String, Value>);

impl DynamicValue {
    /// Create an empty dynamic value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse compact or pretty JSON text; the document must be an object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ReflectError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| ReflectError::Parse {
            path: String::new(),
            value: e.to_string(),
            target: "dynamic value",
        })?;
        Self::try_from(value)
    }

    /// Compact JSON encoding.
    pub fn to_vec(&self) -> Vec<u8> {
        // Serializing a map of JSON values cannot fail.
        serde_json::to_vec(&self.0).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let mut value = value.into();
        canonicalize_numbers(&mut value);
        self.0.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Object view as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for DynamicValue {
    fn from(mut map: Map<String, Value>) -> Self {
        map.values_mut().for_each(canonicalize_numbers);
        Self(map)
    }
}

impl From<DynamicValue> for Map<String, Value> {
    fn from(value: DynamicValue) -> Self {
        value.0
    }
}

impl TryFrom<Value> for DynamicValue {
    type Error = ReflectError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(ReflectError::UnexpectedJson {
                path: String::new(),
                expected: "object",
                found: json_kind(&other),
            }),
        }
    }
}

/// Integer form of an integral float that fits `i64` or `u64`.
pub(crate) fn integral_number(f: f64) -> Option<Number> {
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    // i64::MAX and u64::MAX round up to 2^63 and 2^64 as f64.
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Number::from(f as i64))
    } else if f >= 0.0 && f < u64::MAX as f64 {
        Some(Number::from(f as u64))
    } else {
        None
    }
}

/// Rewrite integral float numbers anywhere in `value` as integers.
pub fn canonicalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(int) = n.as_f64().and_then(integral_number) {
                *n = int;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(canonicalize_numbers),
        Value::Object(map) => map.values_mut().for_each(canonicalize_numbers),
        _ => {}
    }
}

/// Non-null datetime column value.
///
/// The zero value is `0001-01-01 00:00:00`, which formats to an empty string
/// in the string converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    /// The zero timestamp.
    pub fn zero() -> Self {
        let date = NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN);
        Self(date.and_time(NaiveTime::MIN))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

/// Nullable datetime column value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NullTime(pub Option<NaiveDateTime>);

impl NullTime {
    pub fn new(value: NaiveDateTime) -> Self {
        Self(Some(value))
    }

    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&NaiveDateTime> {
        self.0.as_ref()
    }
}

impl From<NaiveDateTime> for NullTime {
    fn from(value: NaiveDateTime) -> Self {
        Self(Some(value))
    }
}

/// Raw JSON column bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonBytes(pub Vec<u8>);

impl JsonBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossy UTF-8 view, for diagnostics.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for JsonBytes {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for JsonBytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dynamic_value_requires_object() {
        assert!(DynamicValue::from_slice(br#"{"a":"x","b":2}"#).is_ok());
        assert!(DynamicValue::from_slice(b"[1,2]").is_err());
        assert!(DynamicValue::from_slice(b"null").is_err());
        assert!(DynamicValue::from_slice(b"{").is_err());
    }

    #[test]
    fn test_dynamic_value_compact_encoding() {
        let dv = DynamicValue::try_from(json!({"b": 2, "a": "x", "c": [1.5, null]})).unwrap();
        assert_eq!(dv.to_vec(), br#"{"a":"x","b":2,"c":[1.5,null]}"#.to_vec());
    }

    #[test]
    fn test_integral_floats_encode_without_fraction() {
        let bytes = br#"{"amount":2.0,"rate":0.5,"rows":[{"n":-3.0}]}"#;
        let dv = DynamicValue::from_slice(bytes).unwrap();
        assert_eq!(
            dv.to_vec(),
            br#"{"amount":2,"rate":0.5,"rows":[{"n":-3}]}"#.to_vec()
        );

        let mut dv = DynamicValue::new();
        dv.insert("total", 10.0);
        assert_eq!(dv.to_vec(), br#"{"total":10}"#.to_vec());

        let parsed: DynamicValue = serde_json::from_str(r#"{"x":1e3}"#).unwrap();
        assert_eq!(parsed.to_vec(), br#"{"x":1000}"#.to_vec());
    }

    #[test]
    fn test_timestamp_zero() {
        assert!(Timestamp::default().is_zero());
        let dt = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(!Timestamp(dt).is_zero());
    }

    #[test]
    fn test_null_time_validity() {
        assert!(!NullTime::default().is_valid());
        let dt = NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert!(NullTime::from(dt).is_valid());
    }
}

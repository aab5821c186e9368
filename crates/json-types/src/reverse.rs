//! Reverse conversion: string or JSON column bytes → typed value.
//!
//! The JSON column readers tolerate two kinds of dirty data that appear in
//! stored rows: empty bytes and an empty object literal (`{}`, surrounded by
//! any whitespace) both read as absent.

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use reflect_core::error::json_kind;
use reflect_core::{DynamicValue, NullTime, Timestamp};
use serde_json::Value;

use crate::error::JsonTypesError;
use crate::{LAYOUT_DATE_ONLY, LAYOUT_DATE_TIME_PARSE};

/// Parse a nullable datetime from a display string.
///
/// Supports, after trimming whitespace:
/// - `""` → unset
/// - `"2025-12-01 08:30:00"`, optionally with fractional seconds
/// - `"2025-12-01"` (midnight)
/// - `"2025-02"` → last day of that month, midnight
///
/// Anything else reads as unset rather than failing.
pub fn string_to_null_time(s: &str) -> NullTime {
    let s = s.trim();
    if s.is_empty() {
        return NullTime::null();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, LAYOUT_DATE_TIME_PARSE) {
        return NullTime::new(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, LAYOUT_DATE_ONLY) {
        return NullTime::new(date.and_time(NaiveTime::MIN));
    }
    match last_day_of_month(s) {
        Some(date) => NullTime::new(date.and_time(NaiveTime::MIN)),
        None => NullTime::null(),
    }
}

/// `YYYY-MM` → the last calendar day of that month.
fn last_day_of_month(s: &str) -> Option<NaiveDate> {
    if s.len() != 7 || s.as_bytes()[4] != b'-' {
        return None;
    }
    let first = NaiveDate::parse_from_str(&format!("{s}-01"), LAYOUT_DATE_ONLY).ok()?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Parse a datetime strictly as `YYYY-MM-DD HH:MM:SS[.fff]`; `""` is the zero timestamp.
pub fn string_to_timestamp(s: &str) -> Result<Timestamp, JsonTypesError> {
    if s.is_empty() {
        return Ok(Timestamp::zero());
    }
    NaiveDateTime::parse_from_str(s, LAYOUT_DATE_TIME_PARSE)
        .map(Timestamp)
        .map_err(|source| JsonTypesError::InvalidDateTime {
            value: s.to_string(),
            source,
        })
}

/// Decode a JSON array of strings.
///
/// Empty input, `null` and `{}` read as a nil list; `[]` reads as an empty one.
pub fn json_to_string_list(bytes: &[u8]) -> Result<Option<Vec<String>>, JsonTypesError> {
    let Some(items) = parse_column_array(bytes)? else {
        return Ok(None);
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => out.push(s),
            other => return Err(JsonTypesError::ExpectedString(json_kind(&other))),
        }
    }
    Ok(Some(out))
}

/// Decode a JSON array of objects.
///
/// Empty input, `null` and `{}` read as a nil list. `null` elements become
/// unset entries; any other non-object element is an error.
pub fn json_to_dynamic_list(
    bytes: &[u8],
) -> Result<Option<Vec<Option<DynamicValue>>>, JsonTypesError> {
    let Some(items) = parse_column_array(bytes)? else {
        return Ok(None);
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Null => out.push(None),
            Value::Object(map) => out.push(Some(DynamicValue::from(map))),
            other => return Err(JsonTypesError::ExpectedObject(json_kind(&other))),
        }
    }
    Ok(Some(out))
}

/// Decode a JSON object. Anything that is not an object is an error.
pub fn json_to_dynamic(bytes: &[u8]) -> Result<DynamicValue, JsonTypesError> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(DynamicValue::from(map)),
        other => Err(JsonTypesError::ExpectedObject(json_kind(&other))),
    }
}

/// Shared prelude of the array readers. `Ok(None)` means nil.
fn parse_column_array(bytes: &[u8]) -> Result<Option<Vec<Value>>, JsonTypesError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(bytes)?;
    if is_empty_object_literal(bytes) {
        return Ok(None);
    }
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items)),
        other => Err(JsonTypesError::ExpectedArray(json_kind(&other))),
    }
}

fn is_empty_object_literal(bytes: &[u8]) -> bool {
    let is_space = |b: &u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r');
    let start = bytes.iter().position(|b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    &bytes[start..end] == b"{}"
}

//! Forward conversion: typed value → string or JSON column bytes.
//!
//! None of these conversions can fail; every typed value has a wire form.

use chrono::Timelike;
use reflect_core::{DynamicValue, JsonBytes, NullTime, Timestamp};

use crate::{LAYOUT_DATE_ONLY, LAYOUT_DATE_TIME};

/// Format a nullable datetime for display.
///
/// - unset → `""`
/// - exactly midnight → `YYYY-MM-DD`
/// - otherwise → `YYYY-MM-DD HH:MM:SS`
pub fn null_time_to_string(value: &NullTime) -> String {
    let Some(dt) = value.get() else {
        return String::new();
    };
    if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
        dt.format(LAYOUT_DATE_ONLY).to_string()
    } else {
        dt.format(LAYOUT_DATE_TIME).to_string()
    }
}

/// Format a datetime as `YYYY-MM-DD HH:MM:SS`; the zero timestamp becomes `""`.
pub fn timestamp_to_string(value: &Timestamp) -> String {
    if value.is_zero() {
        return String::new();
    }
    value.as_naive().format(LAYOUT_DATE_TIME).to_string()
}

/// Encode a string list as a JSON array. A nil list encodes to `null`.
pub fn string_list_to_json(list: Option<&[String]>) -> JsonBytes {
    let Some(list) = list else {
        return JsonBytes::from("null");
    };
    let mut buf = Vec::with_capacity(2 + list.len() * 2);
    buf.push(b'[');
    for (i, s) in list.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        // A string always serializes.
        buf.extend_from_slice(&serde_json::to_vec(s).unwrap_or_default());
    }
    buf.push(b']');
    JsonBytes(buf)
}

/// Encode a list of dynamic values as a JSON array of objects.
///
/// Unset entries become `null`. A nil list encodes to `[]`.
pub fn dynamic_list_to_json(list: Option<&[Option<DynamicValue>]>) -> JsonBytes {
    let list = list.unwrap_or_default();
    let mut buf = Vec::with_capacity(2 + list.len() * 2);
    buf.push(b'[');
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        match item {
            Some(dv) => buf.extend_from_slice(&dv.to_vec()),
            None => buf.extend_from_slice(b"null"),
        }
    }
    buf.push(b']');
    JsonBytes(buf)
}

/// Encode a dynamic value as a JSON object. An unset value encodes to `{}`.
pub fn dynamic_to_json(value: Option<&DynamicValue>) -> JsonBytes {
    match value {
        Some(dv) => JsonBytes(dv.to_vec()),
        None => JsonBytes::from("{}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn datetime(h: u32, m: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_null_time_midnight_is_date_only() {
        assert_eq!(null_time_to_string(&NullTime::new(datetime(0, 0, 0))), "2025-12-01");
    }

    #[test]
    fn test_null_time_with_time_of_day() {
        assert_eq!(
            null_time_to_string(&NullTime::new(datetime(8, 30, 5))),
            "2025-12-01 08:30:05"
        );
        assert_eq!(null_time_to_string(&NullTime::null()), "");
    }

    #[test]
    fn test_timestamp_zero_is_empty() {
        assert_eq!(timestamp_to_string(&Timestamp::zero()), "");
        assert_eq!(
            timestamp_to_string(&Timestamp(datetime(0, 0, 0))),
            "2025-12-01 00:00:00"
        );
    }

    #[test]
    fn test_string_list_nil_vs_empty() {
        assert_eq!(string_list_to_json(None).as_bytes(), b"null");
        assert_eq!(string_list_to_json(Some(&[][..])).as_bytes(), b"[]");
    }

    #[test]
    fn test_string_list_escapes() {
        let list = vec!["a\"b".to_string(), "ü".to_string()];
        assert_eq!(
            string_list_to_json(Some(list.as_slice())).as_bytes(),
            "[\"a\\\"b\",\"ü\"]".as_bytes()
        );
    }

    #[test]
    fn test_dynamic_list_preserves_null_entries() {
        let dv = DynamicValue::try_from(json!({"k": 1})).unwrap();
        let list = vec![Some(dv), None];
        assert_eq!(
            dynamic_list_to_json(Some(list.as_slice())).as_bytes(),
            br#"[{"k":1},null]"#
        );
        assert_eq!(dynamic_list_to_json(None).as_bytes(), b"[]");
    }

    #[test]
    fn test_dynamic_unset_is_empty_object() {
        assert_eq!(dynamic_to_json(None).as_bytes(), b"{}");
    }
}

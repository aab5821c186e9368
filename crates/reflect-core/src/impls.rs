//! `Reflect` implementations for built-in and value types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use serde_json::Value;

use crate::error::ReflectError;
use crate::reflect::{
    DynamicMut, Reflect, ReflectList, ReflectMut, ReflectPointer, ReflectRef, ReflectScalar,
};
use crate::shape::{ScalarKind, ShapeKind, TypeShape};
use crate::values::{integral_number, DynamicValue, JsonBytes, NullTime, Timestamp};
use crate::__reflect_plumbing;

macro_rules! impl_scalar_reflect {
    ($t:ty, $kind:expr, |$v:ident| $zero:expr) => {
        impl Reflect for $t {
            fn shape() -> TypeShape {
                TypeShape::new::<Self>(ShapeKind::Scalar($kind))
            }

            __reflect_plumbing!();

            fn is_zero(&self) -> bool {
                let $v = self;
                $zero
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Scalar(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(self)
            }
        }
    };
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(
            impl_scalar_reflect!($t, ScalarKind::Int, |v| *v == 0);

            impl ReflectScalar for $t {
                fn to_json(&self) -> Result<Value, ReflectError> {
                    Ok(Value::from(*self))
                }

                fn set_json(&mut self, value: &Value, weak: bool) -> Result<(), ReflectError> {
                    if let Some(wide) = json_to_i64(value, weak, stringify!($t))? {
                        *self = <$t>::try_from(wide)
                            .map_err(|_| ReflectError::out_of_range(wide, stringify!($t)))?;
                    }
                    Ok(())
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl_scalar_reflect!($t, ScalarKind::Uint, |v| *v == 0);

            impl ReflectScalar for $t {
                fn to_json(&self) -> Result<Value, ReflectError> {
                    Ok(Value::from(*self))
                }

                fn set_json(&mut self, value: &Value, weak: bool) -> Result<(), ReflectError> {
                    if let Some(wide) = json_to_u64(value, weak, stringify!($t))? {
                        *self = <$t>::try_from(wide)
                            .map_err(|_| ReflectError::out_of_range(wide, stringify!($t)))?;
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl_scalar_reflect!(f64, ScalarKind::Float, |v| *v == 0.0);
impl_scalar_reflect!(f32, ScalarKind::Float, |v| *v == 0.0);
impl_scalar_reflect!(bool, ScalarKind::Bool, |v| !*v);
impl_scalar_reflect!(String, ScalarKind::String, |v| v.is_empty());
impl_scalar_reflect!(Timestamp, ScalarKind::Timestamp, |v| v.is_zero());
impl_scalar_reflect!(NullTime, ScalarKind::NullTime, |v| !v.is_valid());
impl_scalar_reflect!(JsonBytes, ScalarKind::JsonBytes, |v| v.is_empty());

impl ReflectScalar for f64 {
    fn to_json(&self) -> Result<Value, ReflectError> {
        finite_number(*self, "f64")
    }

    fn set_json(&mut self, value: &Value, weak: bool) -> Result<(), ReflectError> {
        if let Some(f) = json_to_f64(value, weak, "f64")? {
            *self = f;
        }
        Ok(())
    }
}

impl ReflectScalar for f32 {
    fn to_json(&self) -> Result<Value, ReflectError> {
        finite_number(f64::from(*self), "f32")
    }

    fn set_json(&mut self, value: &Value, weak: bool) -> Result<(), ReflectError> {
        if let Some(f) = json_to_f64(value, weak, "f32")? {
            *self = f as f32;
        }
        Ok(())
    }
}

impl ReflectScalar for bool {
    fn to_json(&self) -> Result<Value, ReflectError> {
        Ok(Value::Bool(*self))
    }

    fn set_json(&mut self, value: &Value, weak: bool) -> Result<(), ReflectError> {
        match value {
            Value::Null => {}
            Value::Bool(b) => *self = *b,
            Value::Number(n) if weak => *self = n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) if weak => {
                *self = match s.as_str() {
                    "" => false,
                    "1" | "t" | "T" | "true" | "TRUE" | "True" => true,
                    "0" | "f" | "F" | "false" | "FALSE" | "False" => false,
                    other => return Err(ReflectError::parse(other, "bool")),
                }
            }
            other => return Err(ReflectError::unexpected("boolean", other)),
        }
        Ok(())
    }
}

impl ReflectScalar for String {
    fn to_json(&self) -> Result<Value, ReflectError> {
        Ok(Value::String(self.clone()))
    }

    fn set_json(&mut self, value: &Value, weak: bool) -> Result<(), ReflectError> {
        match value {
            Value::Null => {}
            Value::String(s) => self.clone_from(s),
            Value::Number(n) if weak => *self = n.to_string(),
            Value::Bool(b) if weak => *self = if *b { "1" } else { "0" }.to_string(),
            other => return Err(ReflectError::unexpected("string", other)),
        }
        Ok(())
    }
}

impl ReflectScalar for Timestamp {
    fn to_json(&self) -> Result<Value, ReflectError> {
        Ok(Value::String(rfc3339(&self.0)))
    }

    fn set_json(&mut self, value: &Value, _weak: bool) -> Result<(), ReflectError> {
        match value {
            Value::Null => {}
            Value::String(s) if s.is_empty() => *self = Timestamp::zero(),
            Value::String(s) => {
                let dt = parse_json_datetime(s).ok_or_else(|| ReflectError::parse(s, "timestamp"))?;
                *self = Timestamp(dt)
            }
            other => return Err(ReflectError::unexpected("string", other)),
        }
        Ok(())
    }
}

impl ReflectScalar for NullTime {
    fn to_json(&self) -> Result<Value, ReflectError> {
        Ok(match &self.0 {
            Some(dt) => Value::String(rfc3339(dt)),
            None => Value::Null,
        })
    }

    fn set_json(&mut self, value: &Value, _weak: bool) -> Result<(), ReflectError> {
        match value {
            Value::Null => *self = NullTime::null(),
            Value::String(s) if s.is_empty() => *self = NullTime::null(),
            Value::String(s) => {
                *self = NullTime(Some(
                    parse_json_datetime(s).ok_or_else(|| ReflectError::parse(s, "nullable time"))?,
                ))
            }
            other => return Err(ReflectError::unexpected("string", other)),
        }
        Ok(())
    }
}

impl ReflectScalar for JsonBytes {
    fn to_json(&self) -> Result<Value, ReflectError> {
        if self.0.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.0).map_err(|e| ReflectError::Encode {
            type_name: "JsonBytes",
            reason: e.to_string(),
        })
    }

    fn set_json(&mut self, value: &Value, _weak: bool) -> Result<(), ReflectError> {
        self.0 = serde_json::to_vec(value).map_err(|e| ReflectError::Encode {
            type_name: "JsonBytes",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// Owning nullable pointer, the counterpart of `*T`.
impl<T: Reflect + Clone + Default> Reflect for Option<Box<T>> {
    fn shape() -> TypeShape {
        TypeShape::new::<Self>(ShapeKind::Pointer(T::shape))
    }

    __reflect_plumbing!();

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self.as_deref().map(|v| v as &dyn Reflect))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Reflect + Clone + Default> ReflectPointer for Option<Box<T>> {
    fn elem_shape(&self) -> TypeShape {
        T::shape()
    }

    fn get(&self) -> Option<&dyn Reflect> {
        self.as_deref().map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_deref_mut().map(|v| v as &mut dyn Reflect)
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Reflect {
        &mut **self.get_or_insert_with(Box::default)
    }

    fn reset(&mut self) -> &mut dyn Reflect {
        &mut **self.insert(Box::default())
    }

    fn set_nil(&mut self) {
        *self = None;
    }
}

impl<T: Reflect + Clone + Default> Reflect for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::new::<Self>(ShapeKind::List(T::shape))
    }

    __reflect_plumbing!();

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }
}

impl<T: Reflect + Clone + Default> ReflectList for Vec<T> {
    fn elem_shape(&self) -> TypeShape {
        T::shape()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn is_nil(&self) -> bool {
        false
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn set_nil(&mut self) {
        Vec::clear(self);
    }

    fn push_default(&mut self) -> &mut dyn Reflect {
        self.push(T::default());
        let last = Vec::len(self) - 1;
        &mut self[last]
    }
}

/// Nil-able list, the counterpart of a Go slice that may be `nil`.
impl<T: Reflect + Clone + Default> Reflect for Option<Vec<T>> {
    fn shape() -> TypeShape {
        TypeShape::new::<Self>(ShapeKind::List(T::shape))
    }

    __reflect_plumbing!();

    fn is_zero(&self) -> bool {
        self.as_ref().map_or(true, |v| v.is_empty())
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }
}

impl<T: Reflect + Clone + Default> ReflectList for Option<Vec<T>> {
    fn elem_shape(&self) -> TypeShape {
        T::shape()
    }

    fn len(&self) -> usize {
        self.as_ref().map_or(0, Vec::len)
    }

    fn is_nil(&self) -> bool {
        self.is_none()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_ref()?.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut()?
            .as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }

    fn clear(&mut self) {
        *self = Some(Vec::new());
    }

    fn set_nil(&mut self) {
        *self = None;
    }

    fn push_default(&mut self) -> &mut dyn Reflect {
        let items = self.get_or_insert_with(Vec::new);
        items.push(T::default());
        let last = items.len() - 1;
        &mut items[last]
    }
}

impl Reflect for DynamicValue {
    fn shape() -> TypeShape {
        TypeShape::new::<Self>(ShapeKind::Dynamic)
    }

    __reflect_plumbing!();

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Dynamic(Some(self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(DynamicMut::Value(self))
    }
}

/// Nullable dynamic value, the counterpart of a nil-able struct message.
impl Reflect for Option<DynamicValue> {
    fn shape() -> TypeShape {
        TypeShape::new::<Self>(ShapeKind::Dynamic)
    }

    __reflect_plumbing!();

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Dynamic(self.as_ref())
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(DynamicMut::Nullable(self))
    }
}

fn finite_number(f: f64, target: &'static str) -> Result<Value, ReflectError> {
    integral_number(f)
        .or_else(|| serde_json::Number::from_f64(f))
        .map(Value::Number)
        .ok_or_else(|| ReflectError::Encode {
            type_name: target,
            reason: format!("unsupported value {f}"),
        })
}

fn json_to_i64(
    value: &Value,
    weak: bool,
    target: &'static str,
) -> Result<Option<i64>, ReflectError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Ok(Some(f as i64))
                } else {
                    Err(ReflectError::out_of_range(n, target))
                }
            } else {
                Err(ReflectError::out_of_range(n, target))
            }
        }
        Value::Bool(b) if weak => Ok(Some(i64::from(*b))),
        Value::String(s) if weak && s.is_empty() => Ok(Some(0)),
        Value::String(s) if weak => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ReflectError::parse(s, target)),
        other => Err(ReflectError::unexpected("number", other)),
    }
}

fn json_to_u64(
    value: &Value,
    weak: bool,
    target: &'static str,
) -> Result<Option<u64>, ReflectError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(Some(u))
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f >= 0.0 && f <= u64::MAX as f64 {
                    Ok(Some(f as u64))
                } else {
                    Err(ReflectError::out_of_range(n, target))
                }
            } else {
                Err(ReflectError::out_of_range(n, target))
            }
        }
        Value::Bool(b) if weak => Ok(Some(u64::from(*b))),
        Value::String(s) if weak && s.is_empty() => Ok(Some(0)),
        Value::String(s) if weak => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ReflectError::parse(s, target)),
        other => Err(ReflectError::unexpected("number", other)),
    }
}

fn json_to_f64(
    value: &Value,
    weak: bool,
    target: &'static str,
) -> Result<Option<f64>, ReflectError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| ReflectError::out_of_range(n, target)),
        Value::Bool(b) if weak => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Value::String(s) if weak && s.is_empty() => Ok(Some(0.0)),
        Value::String(s) if weak => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ReflectError::parse(s, target)),
        other => Err(ReflectError::unexpected("number", other)),
    }
}

/// RFC 3339 in UTC with second precision, e.g. `2025-12-01T00:00:00Z`.
fn rfc3339(dt: &NaiveDateTime) -> String {
    dt.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`.
fn parse_json_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_decoding() {
        let mut v = 0i64;
        v.set_json(&json!(2.0), false).unwrap();
        assert_eq!(v, 2);

        let mut small = 0i8;
        assert!(small.set_json(&json!(300), false).is_err());

        let mut u = 0u32;
        assert!(u.set_json(&json!(-1), false).is_err());
    }

    #[test]
    fn test_weak_decoding_only_when_enabled() {
        let mut v = 0i64;
        assert!(v.set_json(&json!("42"), false).is_err());
        v.set_json(&json!("42"), true).unwrap();
        assert_eq!(v, 42);

        let mut s = String::new();
        assert!(s.set_json(&json!(7), false).is_err());
        s.set_json(&json!(7), true).unwrap();
        assert_eq!(s, "7");

        let mut b = false;
        b.set_json(&json!("true"), true).unwrap();
        assert!(b);
    }

    #[test]
    fn test_null_leaves_scalar_untouched() {
        let mut s = "keep".to_string();
        s.set_json(&Value::Null, false).unwrap();
        assert_eq!(s, "keep");
    }

    #[test]
    fn test_float_json_form() {
        assert!(f64::NAN.to_json().is_err());
        assert_eq!(2.0f64.to_json().unwrap(), json!(2));
        assert_eq!(2.5f64.to_json().unwrap(), json!(2.5));
        assert_eq!((-4.0f32).to_json().unwrap(), json!(-4));
        assert_eq!(1.5f64.to_json().unwrap(), json!(1.5));
    }

    #[test]
    fn test_timestamp_json_form() {
        let dt = NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Timestamp(dt).to_json().unwrap(), json!("2025-12-01T00:00:00Z"));

        let mut ts = Timestamp::default();
        ts.set_json(&json!("2025-12-01 00:00:00"), false).unwrap();
        assert_eq!(ts, Timestamp(dt));
    }

    #[test]
    fn test_nil_list_vs_empty_list() {
        let nil: Option<Vec<String>> = None;
        let empty: Option<Vec<String>> = Some(Vec::new());
        assert!(ReflectList::is_nil(&nil));
        assert!(!ReflectList::is_nil(&empty));
        assert!(nil.is_zero());
    }

    #[test]
    fn test_push_default_on_nil_list() {
        let mut list: Option<Vec<i64>> = None;
        let slot = list.push_default();
        if let ReflectMut::Scalar(s) = slot.reflect_mut() {
            s.set_json(&json!(5), false).unwrap();
        }
        assert_eq!(list, Some(vec![5]));
    }

    #[test]
    fn test_assign_checks_type() {
        let mut target = String::from("old");
        assert!(target.assign(Box::new(String::from("new"))).is_ok());
        assert_eq!(target, "new");
        assert!(target.assign(Box::new(5i64)).is_err());
    }
}

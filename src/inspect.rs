//! Normalisation of raw column values through the converter registry.
//!
//! Each helper converts the input to its typed form and back with the same
//! converters the engine uses, so the output is what a round trip through an
//! entity/transport conversion would store.

use anyhow::Context;
use clap::ValueEnum;
use copy_engine::{Copier, CopyOptions};
use reflect_core::{DynamicValue, JsonBytes, NullTime, Reflect};

/// Typed form of a JSON column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColumnKind {
    /// JSON array of strings
    StringList,
    /// JSON array of objects
    ObjectList,
    /// JSON object
    Object,
}

fn strict() -> CopyOptions {
    CopyOptions::default().with_strict(true)
}

/// Canonical form of a datetime string: `YYYY-MM-DD HH:MM:SS`, date only at
/// midnight, empty when unparsable.
pub fn normalize_time(copier: &Copier, value: &str) -> anyhow::Result<String> {
    let mut time = NullTime::null();
    copier.convert(&mut time, &value.to_string(), &strict())?;
    let mut out = String::new();
    copier.convert(&mut out, &time, &strict())?;
    Ok(out)
}

/// Decode `bytes` as a `kind` column and re-encode it.
pub fn normalize_column(
    copier: &Copier,
    kind: ColumnKind,
    bytes: &[u8],
) -> anyhow::Result<String> {
    let source = JsonBytes(bytes.to_vec());
    let out = match kind {
        ColumnKind::StringList => round_trip::<Option<Vec<String>>>(copier, &source),
        ColumnKind::ObjectList => round_trip::<Option<Vec<Option<DynamicValue>>>>(copier, &source),
        ColumnKind::Object => round_trip::<Option<DynamicValue>>(copier, &source),
    }
    .with_context(|| format!("Failed to decode {kind:?} column"))?;
    Ok(out.to_string_lossy())
}

fn round_trip<T: Reflect + Default>(
    copier: &Copier,
    source: &JsonBytes,
) -> anyhow::Result<JsonBytes> {
    let mut typed = T::default();
    copier.convert(&mut typed, source, &strict())?;
    let mut out = JsonBytes::default();
    copier.convert(&mut out, &typed, &strict())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_time() {
        let copier = Copier::default();
        assert_eq!(normalize_time(&copier, "2025-12-01 00:00:00").unwrap(), "2025-12-01");
        assert_eq!(
            normalize_time(&copier, "2025-12-01 08:30:00").unwrap(),
            "2025-12-01 08:30:00"
        );
        assert_eq!(normalize_time(&copier, "2024-02").unwrap(), "2024-02-29");
        assert_eq!(normalize_time(&copier, "garbage").unwrap(), "");
    }

    #[test]
    fn test_normalize_column() {
        let copier = Copier::default();
        assert_eq!(
            normalize_column(&copier, ColumnKind::StringList, br#"[ "a", "b" ]"#).unwrap(),
            r#"["a","b"]"#
        );
        assert_eq!(
            normalize_column(&copier, ColumnKind::StringList, b" {} ").unwrap(),
            "null"
        );
        assert_eq!(
            normalize_column(&copier, ColumnKind::ObjectList, b"").unwrap(),
            "[]"
        );
        assert_eq!(
            normalize_column(&copier, ColumnKind::Object, br#"{ "k" : 1 }"#).unwrap(),
            r#"{"k":1}"#
        );
        assert!(normalize_column(&copier, ColumnKind::Object, b"[1]").is_err());
    }
}

//! Conversion options.

use serde::{Deserialize, Serialize};

/// Flags controlling a single conversion.
///
/// Deserializes from a `[copy]` configuration table; missing keys default
/// to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyOptions {
    /// Never copy a source field that holds its type's zero value.
    pub ignore_empty: bool,

    /// Give reference fields independent storage. Every copy is an owned
    /// clone, so this always holds.
    pub deep_copy: bool,

    /// Fail with `ConvertError::TypeMismatch` instead of skipping fields
    /// that cannot be copied.
    pub strict: bool,
}

impl CopyOptions {
    /// Preset for transport messages carrying dynamic values.
    pub fn transport() -> Self {
        Self {
            ignore_empty: true,
            deep_copy: true,
            strict: false,
        }
    }

    /// Preset for entity ↔ transport conversions through the converter registry.
    pub fn entity() -> Self {
        Self {
            ignore_empty: true,
            deep_copy: true,
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_partial_toml() {
        let options: CopyOptions = toml::from_str("ignore_empty = true").unwrap();
        assert!(options.ignore_empty);
        assert!(!options.deep_copy);
        assert!(!options.strict);
    }

    #[test]
    fn test_presets() {
        assert!(CopyOptions::transport().ignore_empty);
        assert!(CopyOptions::entity().deep_copy);
        assert!(CopyOptions::default().with_strict(true).strict);
    }
}

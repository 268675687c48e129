//! Binding configuration
//!
//! Every table is keyed by field name. A key containing a dot addresses a
//! field of a nested record (`"x.i"` is field `i` of the record in field `x`);
//! [`Config::nested`] produces the configuration seen one level down.
//!
//! Only `remap` and `prefixed` influence schema extension. The other options
//! are read by the binder alone.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::constants::{
    FIELD_PATH_SEPARATOR, PARAM_CAST, PARAM_FLATTENED, PARAM_PREFIXED, PARAM_REMAP,
};
use crate::error::{Error, Result};

/// Key-resolution tables and binder options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Field name -> input key to read it from
    pub remap:       BTreeMap<String, String>,
    /// Field name -> key prefix
    ///
    /// For schema extension the field's key is the first input key that starts
    /// with the prefix, minus the prefix. When several input keys share the
    /// prefix the first one in input order wins, so prefixes should be
    /// unambiguous. The binder builds the field's record from every key with
    /// the prefix.
    pub prefixed:    BTreeMap<String, String>,
    /// Record fields bound from the enclosing mapping itself
    pub flattened:   BTreeSet<String>,
    /// Fields whose values are converted to the declared primitive type before checking
    pub cast:        BTreeSet<String>,
    /// When false, values that do not match their declared type are kept untyped
    pub check_types: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remap:       BTreeMap::new(),
            prefixed:    BTreeMap::new(),
            flattened:   BTreeSet::new(),
            cast:        BTreeSet::new(),
            check_types: true,
        }
    }
}

impl Config {
    /// Read `field` from input key `key`
    #[must_use]
    pub fn with_remap(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.remap.insert(field.into(), key.into());
        self
    }

    /// Resolve `field` through keys starting with `prefix`
    #[must_use]
    pub fn with_prefix(mut self, field: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.prefixed.insert(field.into(), prefix.into());
        self
    }

    /// Bind record field `field` from the enclosing mapping
    #[must_use]
    pub fn with_flattened(mut self, field: impl Into<String>) -> Self {
        self.flattened.insert(field.into());
        self
    }

    /// Convert `field`'s value to its declared primitive type
    #[must_use]
    pub fn with_cast(mut self, field: impl Into<String>) -> Self {
        self.cast.insert(field.into());
        self
    }

    /// Turn type checking on or off
    #[must_use]
    pub const fn with_check_types(mut self, check_types: bool) -> Self {
        self.check_types = check_types;
        self
    }

    /// Parse a configuration from JSON text; absent tables are empty
    ///
    /// # Errors
    ///
    /// `Load` for malformed JSON or an unknown table name.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .change_context(Error::failed_to("parse configuration", "invalid JSON"))
    }

    /// Read a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// `Load` when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .change_context(Error::failed_to("read configuration", path.display()))?;
        Self::from_json_str(&text).attach(format!("Configuration file: {}", path.display()))
    }

    /// Input key for a field without a prefix entry: its remap entry, or its own name
    pub fn remapped_key<'a>(&'a self, field: &'a str) -> &'a str {
        self.remap.get(field).map_or(field, String::as_str)
    }

    /// Prefix entry for `field`
    pub fn prefix_for(&self, field: &str) -> Option<&str> {
        self.prefixed.get(field).map(String::as_str)
    }

    /// Whether `field` is flattened
    pub fn is_flattened(&self, field: &str) -> bool {
        self.flattened.contains(field)
    }

    /// Whether `field` is cast
    pub fn is_cast(&self, field: &str) -> bool {
        self.cast.contains(field)
    }

    /// Configuration for the record held in `field`
    ///
    /// Keeps the entries whose keys start with `field.`, with that part removed.
    /// `check_types` is inherited.
    #[must_use]
    pub fn nested(&self, field: &str) -> Self {
        Self {
            remap:       scope_map(&self.remap, field),
            prefixed:    scope_map(&self.prefixed, field),
            flattened:   scope_set(&self.flattened, field),
            cast:        scope_set(&self.cast, field),
            check_types: self.check_types,
        }
    }

    /// `(parameter, field name)` for every entry at this level
    ///
    /// Dotted keys report their first segment, which must name a field here.
    pub fn referenced_fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let remap = self.remap.keys().map(|k| (PARAM_REMAP, k));
        let prefixed = self.prefixed.keys().map(|k| (PARAM_PREFIXED, k));
        let flattened = self.flattened.iter().map(|k| (PARAM_FLATTENED, k));
        let cast = self.cast.iter().map(|k| (PARAM_CAST, k));
        remap
            .chain(prefixed)
            .chain(flattened)
            .chain(cast)
            .map(|(parameter, key)| (parameter, first_segment(key)))
    }
}

fn first_segment(key: &str) -> &str {
    key.split(FIELD_PATH_SEPARATOR).next().unwrap_or(key)
}

fn scoped_key<'a>(key: &'a str, field: &str) -> Option<&'a str> {
    key.strip_prefix(field)?.strip_prefix(FIELD_PATH_SEPARATOR)
}

fn scope_map(map: &BTreeMap<String, String>, field: &str) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(key, value)| {
            scoped_key(key, field).map(|rest| (rest.to_string(), value.clone()))
        })
        .collect()
}

fn scope_set(set: &BTreeSet<String>, field: &str) -> BTreeSet<String> {
    set.iter()
        .filter_map(|key| scoped_key(key, field).map(ToString::to_string))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.check_types);
        assert_eq!(config.remapped_key("a"), "a");
        assert_eq!(config.prefix_for("a"), None);
    }

    #[test]
    fn test_from_json_str_fills_missing_tables() {
        let config =
            Config::from_json_str(r#"{ "remap": { "a": "b" }, "check_types": false }"#).unwrap();
        assert_eq!(config.remapped_key("a"), "b");
        assert!(!config.check_types);
        assert!(config.prefixed.is_empty());
    }

    #[test]
    fn test_from_json_str_rejects_unknown_tables() {
        let report = Config::from_json_str(r#"{ "rename": { "a": "b" } }"#).unwrap_err();
        assert!(matches!(report.current_context(), Error::Load(_)));
    }

    #[test]
    fn test_nested_scoping() {
        let config = Config::default()
            .with_remap("x", "ex")
            .with_remap("x.i", "eye")
            .with_prefix("x.inner", "in_")
            .with_cast("x.i")
            .with_flattened("xy.j")
            .with_check_types(false);

        let nested = config.nested("x");
        assert_eq!(nested.remapped_key("i"), "eye");
        assert_eq!(nested.prefix_for("inner"), Some("in_"));
        assert!(nested.is_cast("i"));
        assert!(nested.flattened.is_empty(), "'xy.j' belongs to field 'xy', not 'x'");
        assert!(!nested.check_types);
        assert_eq!(nested.remap.len(), 1);
    }

    #[test]
    fn test_referenced_fields_use_first_segment() {
        let config = Config::default().with_remap("x.i", "eye").with_cast("n");
        let referenced: Vec<_> = config.referenced_fields().collect();
        assert_eq!(referenced, vec![(PARAM_REMAP, "x"), (PARAM_CAST, "n")]);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "prefixed": { "x": "x_" } }"#).unwrap();
        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.prefix_for("x"), Some("x_"));
    }
}

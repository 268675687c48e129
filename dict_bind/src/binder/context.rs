//! Position tracking while binding nested values

use error_stack::Report;
use serde_json::Value;
use tracing::trace;

use crate::config::Config;
use crate::constants::FIELD_PATH_SEPARATOR;
use crate::error::{Error, Result};
use crate::record::BoundValue;
use crate::schema::{TypeExpr, ValueKind};

/// Where the binder currently is: the config scope and the dotted path of the value
///
/// The root record has an empty path. Record fields append `.name`, list
/// elements append `[index]`.
#[derive(Debug, Clone)]
pub(super) struct BindContext {
    config:      Config,
    path:        String,
    check_types: bool,
}

impl BindContext {
    pub(super) fn root(config: &Config) -> Self {
        Self {
            config:      config.clone(),
            path:        String::new(),
            check_types: config.check_types,
        }
    }

    /// Config scoped to the record at this position
    pub(super) const fn config(&self) -> &Config {
        &self.config
    }

    pub(super) fn path(&self) -> &str {
        &self.path
    }

    /// Context for field `name` of the record at this position
    pub(super) fn field(&self, name: &str) -> Self {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}{FIELD_PATH_SEPARATOR}{name}", self.path)
        };
        Self {
            config: self.config.nested(name),
            path,
            check_types: self.check_types,
        }
    }

    /// Context for list element `index`
    pub(super) fn element(&self, index: usize) -> Self {
        Self {
            config:      self.config.clone(),
            path:        format!("{}[{index}]", self.path),
            check_types: self.check_types,
        }
    }

    /// Context for mapping entry `key`
    pub(super) fn entry(&self, key: &str) -> Self {
        Self {
            config:      self.config.clone(),
            path:        format!("{}{FIELD_PATH_SEPARATOR}{key}", self.path),
            check_types: self.check_types,
        }
    }

    /// Same position, failing on every mismatch regardless of `check_types`
    ///
    /// Union members are tried strictly so the first lenient member does not
    /// swallow values meant for a later one.
    pub(super) fn strict(&self) -> Self {
        Self {
            check_types: true,
            ..self.clone()
        }
    }

    pub(super) const fn checks_types(&self) -> bool {
        self.check_types
    }

    /// Report a value that does not have type `expected`
    ///
    /// With type checking off the value is kept as untyped data instead.
    pub(super) fn mismatch(&self, expected: &TypeExpr, value: &Value) -> Result<BoundValue> {
        let found = ValueKind::of(value);
        if self.check_types {
            return Err(Report::new(Error::wrong_type(&self.path, expected, found)));
        }
        trace!(
            field_path = %self.path,
            expected = %expected,
            found = %found,
            "Type check disabled; keeping untyped value"
        );
        Ok(BoundValue::from_json(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_paths_accumulate() {
        let root = BindContext::root(&Config::default());
        assert_eq!(root.path(), "");

        let field = root.field("x");
        assert_eq!(field.path(), "x");
        assert_eq!(field.field("i").path(), "x.i");
        assert_eq!(field.element(2).field("j").path(), "x[2].j");
        assert_eq!(field.entry("k").path(), "x.k");
    }

    #[test]
    fn test_field_scopes_config() {
        let config = Config::default().with_remap("x.i", "eye");
        let field = BindContext::root(&config).field("x");
        assert_eq!(field.config().remapped_key("i"), "eye");
    }

    #[test]
    fn test_mismatch_respects_check_types() {
        let lenient = BindContext::root(&Config::default().with_check_types(false)).field("n");
        assert_eq!(
            lenient.mismatch(&TypeExpr::int(), &json!("7")).ok(),
            Some(BoundValue::Str("7".into()))
        );

        let report = lenient.strict().mismatch(&TypeExpr::int(), &json!("7")).err();
        assert_eq!(
            report.map(|r| r.current_context().clone()),
            Some(Error::wrong_type("n", "int", "string"))
        );
    }
}

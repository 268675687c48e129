//! Field name -> input key resolution

use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::Config;

/// Resolves the input key a field reads from, honoring `remap` and `prefixed`
#[derive(Debug, Clone, Copy)]
pub(super) struct KeyResolver<'a> {
    data:   &'a Map<String, Value>,
    config: &'a Config,
}

impl<'a> KeyResolver<'a> {
    pub(super) const fn new(data: &'a Map<String, Value>, config: &'a Config) -> Self {
        Self { data, config }
    }

    pub(super) const fn data(&self) -> &'a Map<String, Value> {
        self.data
    }

    /// Key for `field_name`, or `None` when a prefixed field matches no input key
    ///
    /// Prefixed fields take the first input key (in input order) that starts
    /// with the prefix, with the prefix removed.
    pub(super) fn resolve<'s>(&'s self, field_name: &'s str) -> Option<&'s str> {
        let Some(prefix) = self.config.prefix_for(field_name) else {
            return Some(self.config.remapped_key(field_name));
        };

        let mut matches = self.data.keys().filter(|key| key.starts_with(prefix));
        let first = matches.next()?;
        if let Some(second) = matches.next() {
            warn!(
                field = field_name,
                prefix,
                keys = %[first, second].into_iter().chain(matches).join(", "),
                "Several input keys share the prefix; using the first"
            );
        }
        first.strip_prefix(prefix)
    }

    /// The input value at the key `field_name` resolves to
    pub(super) fn value_for(&self, field_name: &str) -> Option<&'a Value> {
        self.resolve(field_name).and_then(|key| self.data.get(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use serde_json::json;

    use super::*;

    fn mapping(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_plain_and_remapped_names() {
        let data = mapping(json!({ "i": 1, "eye": 2 }));
        let config = Config::default().with_remap("j", "eye");
        let resolver = KeyResolver::new(&data, &config);

        assert_eq!(resolver.resolve("i"), Some("i"));
        assert_eq!(resolver.resolve("j"), Some("eye"));
        assert_eq!(resolver.resolve("absent"), Some("absent"));
        assert_eq!(resolver.value_for("j"), Some(&json!(2)));
        assert_eq!(resolver.value_for("absent"), None);
    }

    #[test]
    fn test_prefix_takes_first_match_in_input_order() {
        let data = mapping(json!({ "other": 0, "x_b": 1, "x_a": 2 }));
        let config = Config::default().with_prefix("x", "x_");
        let resolver = KeyResolver::new(&data, &config);

        assert_eq!(resolver.resolve("x"), Some("b"));
    }

    #[test]
    fn test_prefix_without_match_resolves_nothing() {
        let data = mapping(json!({ "i": 1 }));
        let config = Config::default().with_prefix("x", "x_").with_remap("x", "i");
        let resolver = KeyResolver::new(&data, &config);

        assert_eq!(resolver.resolve("x"), None, "prefix entry takes precedence over remap");
        assert_eq!(resolver.value_for("x"), None);
    }
}

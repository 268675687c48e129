//! Named schema lookup and JSON schema documents
//!
//! A schema document lists definitions in order; each may refer to the ones
//! before it:
//!
//! ```json
//! {
//!   "X": { "fields": [ { "name": "i", "type": "int" } ] },
//!   "Z": { "fields": [
//!     { "name": "x", "type": "X" },
//!     { "name": "n", "type": "int", "default": 0 }
//!   ] }
//! }
//! ```
//!
//! A `null` default is read as "no default".

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use error_stack::ResultExt;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{FieldDescriptor, Schema, TypeExpr};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDefinition {
    fields: Vec<FieldDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDefinition {
    name:      String,
    #[serde(rename = "type")]
    type_expr: String,
    #[serde(default)]
    default:   Option<Value>,
}

/// Schemas addressable by name, used to resolve record names in type expressions
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema under its own name, replacing any previous one, and hand it back
    pub fn register(&mut self, schema: Arc<Schema>) -> Arc<Schema> {
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        schema
    }

    /// Look up a schema by name
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Build and register a schema from `(field name, type expression)` pairs
    ///
    /// # Errors
    ///
    /// Fails when a type expression does not parse or the schema is invalid.
    pub fn define(&mut self, name: &str, fields: &[(&str, &str)]) -> Result<Arc<Schema>> {
        let registry: &Self = self;
        let builder = fields
            .iter()
            .try_fold(Schema::builder(name), |builder, (field, type_text)| {
                Ok::<_, error_stack::Report<Error>>(
                    builder.field(*field, TypeExpr::parse(type_text, registry)?),
                )
            })?;
        Ok(self.register(builder.build()?))
    }

    /// Load a schema document from JSON text
    ///
    /// # Errors
    ///
    /// `InvalidSchema` for a malformed document, otherwise the first
    /// definition error.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let definitions: IndexMap<String, SchemaDefinition> = serde_json::from_str(text)
            .change_context(Error::InvalidSchema("malformed schema document".to_string()))?;

        let mut registry = Self::new();
        for (name, definition) in definitions {
            registry.load_definition(&name, definition)?;
        }
        debug!(schemas = registry.len(), "Loaded schema document");
        Ok(registry)
    }

    /// Load a schema document from a JSON file
    ///
    /// # Errors
    ///
    /// `Load` when the file cannot be read, then as [`Self::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .change_context(Error::failed_to("read schema document", path.display()))?;
        Self::from_json_str(&text).attach(format!("Schema document: {}", path.display()))
    }

    fn load_definition(&mut self, name: &str, definition: SchemaDefinition) -> Result<()> {
        let mut builder = Schema::builder(name);
        for field in definition.fields {
            let declared_type = TypeExpr::parse(&field.type_expr, self)
                .attach(format!("Field '{}' of schema '{name}'", field.name))?;
            let mut descriptor = FieldDescriptor::new(field.name, declared_type);
            if let Some(default) = field.default {
                descriptor = descriptor.with_default(default);
            }
            builder = builder.descriptor(descriptor);
        }
        self.register(builder.build()?);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::schema::FieldDefault;

    const DOCUMENT: &str = r#"{
        "X": { "fields": [ { "name": "i", "type": "int" } ] },
        "Z": { "fields": [
            { "name": "x", "type": "X" },
            { "name": "a", "type": "list<int>" },
            { "name": "n", "type": "int", "default": 0 }
        ] }
    }"#;

    #[test]
    fn test_define_resolves_earlier_schemas() {
        let mut registry = SchemaRegistry::new();
        let x = registry.define("X", &[("i", "int")]).unwrap();
        let z = registry.define("Z", &[("x", "optional<X>")]).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(z.fields()[0].declared_type.as_record().unwrap(), &x));
    }

    #[test]
    fn test_document_loading() {
        let registry = SchemaRegistry::from_json_str(DOCUMENT).unwrap();
        let z = registry.get("Z").unwrap();

        let types: Vec<(&str, String)> = z
            .field_types()
            .into_iter()
            .map(|(name, ty)| (name, ty.to_string()))
            .collect();
        assert_eq!(
            types,
            vec![
                ("x", "X".to_string()),
                ("a", "list<int>".to_string()),
                ("n", "int".to_string())
            ]
        );
        assert_eq!(z.field("n").unwrap().default, FieldDefault::Value(json!(0)));
        assert!(z.field("x").unwrap().default.is_missing());
    }

    #[test]
    fn test_document_forward_reference_fails() {
        let text = r#"{
            "Z": { "fields": [ { "name": "x", "type": "X" } ] },
            "X": { "fields": [] }
        }"#;
        let report = SchemaRegistry::from_json_str(text).unwrap_err();
        assert_eq!(report.current_context(), &Error::UnknownSchema("X".to_string()));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let registry = SchemaRegistry::from_path(file.path()).unwrap();
        assert!(registry.get("X").is_some());

        let missing = SchemaRegistry::from_path(Path::new("/nonexistent/schemas.json"));
        assert!(matches!(
            missing.unwrap_err().current_context(),
            Error::Load(_)
        ));
    }
}

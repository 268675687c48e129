//! Record schemas as data
//!
//! A `Schema` is a named, ordered list of field descriptors. Schemas are
//! immutable and always shared through `Arc`; deriving a new schema never
//! touches the one it was derived from. `Arc::ptr_eq` is the identity test
//! used to tell "the same schema" from "an equal-looking new one".

mod field;
mod registry;
mod type_expr;
mod type_parser;

use std::sync::Arc;

use error_stack::Report;
use itertools::Itertools;
use serde_json::Value;

pub use self::field::{FieldDefault, FieldDescriptor};
pub use self::registry::SchemaRegistry;
pub use self::type_expr::{Primitive, TypeExpr, ValueKind};
use crate::error::{Error, Result};

/// A named, ordered sequence of fields describing a record type
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name:   String,
    fields: Vec<FieldDescriptor>,
    base:   Option<Arc<Schema>>,
}

impl Schema {
    /// Start building a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name:   name.into(),
            fields: Vec::new(),
        }
    }

    /// Create a schema that extends `base`. Field names must already be unique.
    pub(crate) fn derived(
        name: String,
        fields: Vec<FieldDescriptor>,
        base: &Arc<Self>,
    ) -> Arc<Self> {
        debug_assert!(fields.iter().map(|f| &f.name).all_unique());
        Arc::new(Self {
            name,
            fields,
            base: Some(Arc::clone(base)),
        })
    }

    /// Schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a field with this name exists
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// The schema this one was derived from
    pub const fn base(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    /// Whether `self` is `ancestor` or was derived from it, directly or transitively
    pub fn extends(&self, ancestor: &Self) -> bool {
        let mut current = Some(self);
        while let Some(schema) = current {
            if std::ptr::eq(schema, ancestor) {
                return true;
            }
            current = schema.base.as_deref();
        }
        false
    }

    /// `(name, declared type)` pairs in field order
    pub fn field_types(&self) -> Vec<(&str, &TypeExpr)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), &f.declared_type))
            .collect()
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name:   String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Add a field with no default
    #[must_use]
    pub fn field(self, name: impl Into<String>, declared_type: impl Into<TypeExpr>) -> Self {
        self.descriptor(FieldDescriptor::new(name, declared_type.into()))
    }

    /// Add a field with a fixed default value
    #[must_use]
    pub fn field_with_default(
        self,
        name: impl Into<String>,
        declared_type: impl Into<TypeExpr>,
        default: impl Into<Value>,
    ) -> Self {
        self.descriptor(FieldDescriptor::new(name, declared_type.into()).with_default(default))
    }

    /// Add a field whose default is produced by `factory`
    #[must_use]
    pub fn field_with_factory(
        self,
        name: impl Into<String>,
        declared_type: impl Into<TypeExpr>,
        factory: fn() -> Value,
    ) -> Self {
        self.descriptor(FieldDescriptor::new(name, declared_type.into()).with_factory(factory))
    }

    /// Add a prepared descriptor
    #[must_use]
    pub fn descriptor(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish the schema
    ///
    /// # Errors
    ///
    /// `InvalidSchema` for an empty schema name or a repeated field name.
    pub fn build(self) -> Result<Arc<Schema>> {
        if self.name.is_empty() {
            return Err(Report::new(Error::invalid_schema("name", "must not be empty")));
        }
        if let Some(duplicate) = self.fields.iter().map(|f| f.name.as_str()).duplicates().next() {
            return Err(Report::new(Error::invalid_schema(
                "field list",
                format!("'{}' declares field '{duplicate}' more than once", self.name),
            )));
        }
        Ok(Arc::new(Schema {
            name:   self.name,
            fields: self.fields,
            base:   None,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_duplicate_fields() {
        let result = Schema::builder("X")
            .field("i", TypeExpr::int())
            .field("i", TypeExpr::str())
            .build();
        let report = result.unwrap_err();
        assert!(matches!(report.current_context(), Error::InvalidSchema(_)));
    }

    #[test]
    fn test_extends_follows_base_chain() {
        let x = Schema::builder("X").field("i", TypeExpr::int()).build().unwrap();
        let child = Schema::derived("XWithExtraFields".to_string(), x.fields().to_vec(), &x);
        let grandchild = Schema::derived("Again".to_string(), child.fields().to_vec(), &child);
        let unrelated = Schema::builder("X").field("i", TypeExpr::int()).build().unwrap();

        assert!(x.extends(&x));
        assert!(grandchild.extends(&x));
        assert!(!x.extends(&child));
        assert!(!child.extends(&unrelated));
    }
}

use std::fmt;

use serde_json::Value;

use super::TypeExpr;

/// Default applied by the binder when a field's key is absent from the input
#[derive(Clone, Default)]
pub enum FieldDefault {
    /// No default; the field is required unless its type is optional
    #[default]
    Missing,
    /// A fixed value
    Value(Value),
    /// A value produced on every use
    Factory(fn() -> Value),
}

impl FieldDefault {
    /// The explicit absent default given to synthesized and re-wrapped fields
    pub const fn absent() -> Self {
        Self::Value(Value::Null)
    }

    /// Whether neither a value nor a factory is set
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Produce the default value, calling the factory if there is one
    pub fn produce(&self) -> Option<Value> {
        match self {
            Self::Missing => None,
            Self::Value(value) => Some(value.clone()),
            Self::Factory(factory) => Some(factory()),
        }
    }
}

impl PartialEq for FieldDefault {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Factory(a), Self::Factory(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("Missing"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.debug_tuple("Factory").field(&"<fn>").finish(),
        }
    }
}

/// One member of a record schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within its schema
    pub name:          String,
    /// Declared type
    pub declared_type: TypeExpr,
    /// What the binder uses when the input has no value for this field
    pub default:       FieldDefault,
}

impl FieldDescriptor {
    /// A field with no default
    pub fn new(name: impl Into<String>, declared_type: TypeExpr) -> Self {
        Self {
            name: name.into(),
            declared_type,
            default: FieldDefault::Missing,
        }
    }

    /// Set a fixed default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Set a default factory
    #[must_use]
    pub fn with_factory(mut self, factory: fn() -> Value) -> Self {
        self.default = FieldDefault::Factory(factory);
        self
    }
}

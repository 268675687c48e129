//! Declared field types
//!
//! A `TypeExpr` is the data representation of a field's type. Records refer to
//! their schema through an `Arc`, so a type expression is cheap to clone and
//! safe to share across threads.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use super::Schema;

/// Leaf types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// Accepts any value, stored untyped
    Any,
    /// Only `null`
    #[strum(serialize = "none")]
    #[serde(rename = "none")]
    NoneType,
    /// `true` / `false`
    Bool,
    /// Signed 64-bit integers
    Int,
    /// Floating point numbers (integers are accepted)
    Float,
    /// Strings
    Str,
}

/// Shape of a runtime JSON value, used when reporting type mismatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    /// `null`
    Null,
    /// Boolean
    Bool,
    /// Number representable as `i64`
    Int,
    /// Any other number
    Float,
    /// String
    String,
    /// Array
    List,
    /// Object
    Mapping,
}

impl ValueKind {
    /// Classify a JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() => Self::Int,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Mapping,
        }
    }
}

/// Declared type of a record field
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A leaf type
    Primitive(Primitive),
    /// Homogeneous list
    List(Box<TypeExpr>),
    /// String-keyed mapping with homogeneous values
    Map(Box<TypeExpr>),
    /// Present-or-absent wrapper
    Optional(Box<TypeExpr>),
    /// First matching member wins
    Union(Vec<TypeExpr>),
    /// A nested record
    Record(Arc<Schema>),
}

impl TypeExpr {
    /// `any`
    pub const fn any() -> Self {
        Self::Primitive(Primitive::Any)
    }

    /// `none`
    pub const fn none() -> Self {
        Self::Primitive(Primitive::NoneType)
    }

    /// `bool`
    pub const fn bool() -> Self {
        Self::Primitive(Primitive::Bool)
    }

    /// `int`
    pub const fn int() -> Self {
        Self::Primitive(Primitive::Int)
    }

    /// `float`
    pub const fn float() -> Self {
        Self::Primitive(Primitive::Float)
    }

    /// `str`
    pub const fn str() -> Self {
        Self::Primitive(Primitive::Str)
    }

    /// `list<item>`
    pub fn list(item: Self) -> Self {
        Self::List(Box::new(item))
    }

    /// `map<value>`
    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    /// `union<members..>`
    pub const fn union(members: Vec<Self>) -> Self {
        Self::Union(members)
    }

    /// Reference to a record schema
    pub fn record(schema: &Arc<Schema>) -> Self {
        Self::Record(Arc::clone(schema))
    }

    /// `optional<inner>`, or `inner` unchanged if it already admits absence
    pub fn optional(inner: Self) -> Self {
        inner.into_optional()
    }

    /// Wrap in `Optional` unless already optional. Applying it twice is the same as once.
    #[must_use]
    pub fn into_optional(self) -> Self {
        if self.is_optional() {
            self
        } else {
            Self::Optional(Box::new(self))
        }
    }

    /// Whether `null` is a member of this type
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) | Self::Primitive(Primitive::NoneType) => true,
            Self::Union(members) => members.contains(&Self::none()),
            Self::Primitive(_) | Self::List(_) | Self::Map(_) | Self::Record(_) => false,
        }
    }

    /// Remove one level of optional wrapping
    ///
    /// `optional<T>` and `union<T, none>` yield `T`; anything else is returned as is.
    pub fn strip_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner,
            Self::Union(members) if self.is_optional() => {
                let mut present = members.iter().filter(|m| **m != Self::none());
                match (present.next(), present.next()) {
                    (Some(only), None) => only,
                    _ => self,
                }
            }
            _ => self,
        }
    }

    /// The record schema behind one level of optional wrapping, if any
    pub fn as_record(&self) -> Option<&Arc<Schema>> {
        match self.strip_optional() {
            Self::Record(schema) => Some(schema),
            _ => None,
        }
    }

    /// Infer a type from the shape of a runtime value
    ///
    /// Containers are not inspected: arrays become `list<any>` and objects `map<any>`.
    pub fn of_value(value: &Value) -> Self {
        match ValueKind::of(value) {
            ValueKind::Null => Self::none(),
            ValueKind::Bool => Self::bool(),
            ValueKind::Int => Self::int(),
            ValueKind::Float => Self::float(),
            ValueKind::String => Self::str(),
            ValueKind::List => Self::list(Self::any()),
            ValueKind::Mapping => Self::map(Self::any()),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::List(item) => write!(f, "list<{item}>"),
            Self::Map(value) => write!(f, "map<{value}>"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Union(members) => write!(f, "union<{}>", members.iter().join(", ")),
            Self::Record(schema) => write!(f, "{}", schema.name()),
        }
    }
}

impl From<Primitive> for TypeExpr {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<&Arc<Schema>> for TypeExpr {
    fn from(schema: &Arc<Schema>) -> Self {
        Self::record(schema)
    }
}

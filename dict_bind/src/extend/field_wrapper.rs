//! Optional-wrapping of field descriptors
//!
//! Every field of an extended schema is optional, since synthesized fields may
//! sit between original ones and any of them may be missing from a later input.

use crate::schema::{FieldDefault, FieldDescriptor, TypeExpr};

/// What a wrapped field is made from
#[derive(Debug, Clone)]
pub(super) enum WrapSource<'a> {
    /// An existing field, name and type kept
    Field(&'a FieldDescriptor),
    /// An existing field given a new type
    Retyped {
        field:         &'a FieldDescriptor,
        declared_type: TypeExpr,
    },
    /// A field with no original counterpart
    Named {
        name:          &'a str,
        declared_type: TypeExpr,
    },
}

/// Build an optional field with a default
///
/// A source field's default or factory is kept. Fields without one, and fields
/// without a source, get the absent default.
pub(super) fn wrap(source: WrapSource<'_>) -> FieldDescriptor {
    let (name, declared_type, source_default) = match source {
        WrapSource::Field(field) => (
            field.name.clone(),
            field.declared_type.clone(),
            Some(&field.default),
        ),
        WrapSource::Retyped {
            field,
            declared_type,
        } => (field.name.clone(), declared_type, Some(&field.default)),
        WrapSource::Named {
            name,
            declared_type,
        } => (name.to_string(), declared_type, None),
    };

    let default = match source_default {
        Some(default) if !default.is_missing() => default.clone(),
        _ => FieldDefault::absent(),
    };

    FieldDescriptor {
        name,
        declared_type: declared_type.into_optional(),
        default,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn seven() -> Value {
        json!(7)
    }

    #[test]
    fn test_field_without_default_gets_absent_default() {
        let field = FieldDescriptor::new("i", TypeExpr::int());
        let wrapped = wrap(WrapSource::Field(&field));
        assert_eq!(wrapped.name, "i");
        assert_eq!(wrapped.declared_type, TypeExpr::optional(TypeExpr::int()));
        assert_eq!(wrapped.default, FieldDefault::absent());
    }

    #[test]
    fn test_field_default_and_factory_are_kept() {
        let with_value = FieldDescriptor::new("i", TypeExpr::int()).with_default(0);
        assert_eq!(
            wrap(WrapSource::Field(&with_value)).default,
            FieldDefault::Value(json!(0))
        );

        let with_factory = FieldDescriptor::new("i", TypeExpr::int()).with_factory(seven);
        let wrapped = wrap(WrapSource::Field(&with_factory));
        assert_eq!(wrapped.default.produce(), Some(json!(7)));
    }

    #[test]
    fn test_already_optional_type_is_not_rewrapped() {
        let field = FieldDescriptor::new("s", TypeExpr::optional(TypeExpr::str()));
        let wrapped = wrap(WrapSource::Field(&field));
        assert_eq!(wrapped.declared_type.to_string(), "optional<str>");
    }

    #[test]
    fn test_retyped_and_named_sources() {
        let field = FieldDescriptor::new("x", TypeExpr::int()).with_default(1);
        let retyped = wrap(WrapSource::Retyped {
            field:         &field,
            declared_type: TypeExpr::float(),
        });
        assert_eq!(retyped.declared_type.to_string(), "optional<float>");
        assert_eq!(retyped.default, FieldDefault::Value(json!(1)));

        let named = wrap(WrapSource::Named {
            name:          "b",
            declared_type: TypeExpr::bool(),
        });
        assert_eq!(named.name, "b");
        assert_eq!(named.declared_type.to_string(), "optional<bool>");
        assert_eq!(named.default, FieldDefault::absent());
    }
}

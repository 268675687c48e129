//! Recursion into record-typed fields

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use super::field_wrapper::{WrapSource, wrap};
use super::key_resolver::KeyResolver;
use crate::config::Config;
use crate::schema::{FieldDescriptor, Schema, TypeExpr, ValueKind};

/// Re-extend every record field whose input holds a nested mapping
///
/// Returns only the fields whose nested schema actually changed. Fields whose
/// key is absent, or whose value is not a mapping, are left to the plain
/// optional wrapping.
pub(super) fn extended_nested_fields(
    schema: &Schema,
    resolver: &KeyResolver<'_>,
    config: &Config,
) -> Vec<FieldDescriptor> {
    schema
        .fields()
        .iter()
        .filter_map(|field| {
            let nested_schema = field.declared_type.as_record()?;
            let nested_data = match resolver.value_for(&field.name)? {
                Value::Object(nested_data) => nested_data,
                other => {
                    trace!(
                        field = %field.name,
                        found = %ValueKind::of(other),
                        "Record field holds no mapping; not recursing"
                    );
                    return None;
                }
            };

            let extended = super::extend(nested_schema, nested_data, &config.nested(&field.name));
            if Arc::ptr_eq(&extended, nested_schema) {
                return None;
            }

            Some(wrap(WrapSource::Retyped {
                field,
                declared_type: TypeExpr::Record(extended).into_optional(),
            }))
        })
        .collect()
}

//! Fields for input keys the schema does not claim

use std::collections::HashSet;

use super::field_wrapper::{WrapSource, wrap};
use super::key_resolver::KeyResolver;
use crate::schema::{FieldDescriptor, Schema, TypeExpr};

/// One optional field per input key that is not the resolved key of any schema field
///
/// Types come from the runtime value at each key. Input order is kept.
pub(super) fn extra_fields(schema: &Schema, resolver: &KeyResolver<'_>) -> Vec<FieldDescriptor> {
    let claimed: HashSet<&str> = schema
        .fields()
        .iter()
        .filter_map(|field| resolver.resolve(&field.name))
        .collect();

    resolver
        .data()
        .iter()
        .filter(|(key, _)| !claimed.contains(key.as_str()))
        .map(|(key, value)| {
            wrap(WrapSource::Named {
                name:          key,
                declared_type: TypeExpr::of_value(value),
            })
        })
        .collect()
}

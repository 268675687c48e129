//! Field-list merge and extended schema emission

use std::sync::Arc;

use super::field_wrapper::{WrapSource, wrap};
use crate::constants::EXTENDED_SCHEMA_SUFFIX;
use crate::schema::{FieldDescriptor, Schema};

/// Concatenate field lists, a later field replacing an earlier one of the same name in place
pub(super) fn merge_field_lists<I>(lists: I) -> Vec<FieldDescriptor>
where
    I: IntoIterator<Item = Vec<FieldDescriptor>>,
{
    let mut merged: Vec<FieldDescriptor> = Vec::new();
    for field in lists.into_iter().flatten() {
        match merged.iter().position(|existing| existing.name == field.name) {
            Some(index) => merged[index] = field,
            None => merged.push(field),
        }
    }
    merged
}

/// Emit the extended schema, or `schema` itself when nothing was added
///
/// Merge order is: every original field made optional, then the re-extended
/// nested fields, then the extras.
pub(super) fn assemble(
    schema: &Arc<Schema>,
    nested_fields: Vec<FieldDescriptor>,
    extra_fields: Vec<FieldDescriptor>,
) -> Arc<Schema> {
    if nested_fields.is_empty() && extra_fields.is_empty() {
        return Arc::clone(schema);
    }

    let wrapped = schema
        .fields()
        .iter()
        .map(|field| wrap(WrapSource::Field(field)))
        .collect();
    let fields = merge_field_lists([wrapped, nested_fields, extra_fields]);

    Schema::derived(
        format!("{}{EXTENDED_SCHEMA_SUFFIX}", schema.name()),
        fields,
        schema,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;
    use crate::schema::TypeExpr;

    fn names(fields: &[FieldDescriptor]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_merge_replaces_in_place() {
        let merged = merge_field_lists([
            vec![
                FieldDescriptor::new("a", TypeExpr::int()),
                FieldDescriptor::new("b", TypeExpr::int()),
                FieldDescriptor::new("c", TypeExpr::int()),
            ],
            vec![FieldDescriptor::new("b", TypeExpr::str())],
            vec![
                FieldDescriptor::new("d", TypeExpr::bool()),
                FieldDescriptor::new("a", TypeExpr::float()),
            ],
        ]);

        assert_eq!(names(&merged), vec!["a", "b", "c", "d"]);
        assert_eq!(merged[0].declared_type, TypeExpr::float());
        assert_eq!(merged[1].declared_type, TypeExpr::str());
    }

    #[test]
    fn test_merge_never_duplicates_repeated_names() {
        let merged = merge_field_lists([
            vec![FieldDescriptor::new("a", TypeExpr::int())],
            vec![
                FieldDescriptor::new("a", TypeExpr::str()),
                FieldDescriptor::new("a", TypeExpr::bool()),
            ],
        ]);

        assert_eq!(names(&merged), vec!["a"]);
        assert_eq!(merged[0].declared_type, TypeExpr::bool());
    }

    #[test]
    fn test_assemble_without_additions_returns_original() {
        let schema = Schema::builder("X")
            .field("i", TypeExpr::int())
            .build()
            .unwrap();
        let assembled = assemble(&schema, Vec::new(), Vec::new());
        assert!(Arc::ptr_eq(&assembled, &schema));
    }
}

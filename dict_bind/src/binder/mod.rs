//! Binding mappings to schemas
//!
//! [`Binder`] is the seam between schema extension and record construction:
//! [`crate::bind`] prepares the schema and hands it, together with the
//! unmodified input, to a binder. [`RecordBinder`] is the default one.
//!
//! `RecordBinder` walks the schema field by field:
//! - a `flattened` record field is bound from the enclosing mapping itself
//! - a `prefixed` record field is bound from the keys carrying the prefix,
//!   with the prefix removed
//! - any other field reads the value at its (possibly remapped) key
//!
//! A missing key falls back to the field default, then to `none` for
//! optional types, and is otherwise an error. Present values are checked
//! against the declared type, recursing into lists, mappings, unions and
//! nested records.

mod cast;
mod context;


use std::sync::Arc;

use error_stack::{Report, ResultExt};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use self::context::BindContext;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{BoundValue, Record};
use crate::schema::{FieldDescriptor, Primitive, Schema, TypeExpr};

/// Builds a [`Record`] of `schema` from `data`
///
/// Implementations receive the schema exactly as prepared by the caller,
/// extended or not. Errors are returned to the caller unchanged.
pub trait Binder {
    /// Bind `data` to `schema` using the options in `config`
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration`, `MissingValue`, `WrongType` or `UnionMatch`
    /// for the default binder; implementations may add their own.
    fn bind_raw(
        &self,
        schema: &Arc<Schema>,
        data: &Map<String, Value>,
        config: &Config,
    ) -> Result<Record>;
}

/// The default [`Binder`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBinder;

impl Binder for RecordBinder {
    fn bind_raw(
        &self,
        schema: &Arc<Schema>,
        data: &Map<String, Value>,
        config: &Config,
    ) -> Result<Record> {
        Self::bind_record(schema, data, &BindContext::root(config))
            .attach(format!("Binding schema '{}'", schema.name()))
    }
}

impl RecordBinder {
    fn bind_record(
        schema: &Arc<Schema>,
        data: &Map<String, Value>,
        context: &BindContext,
    ) -> Result<Record> {
        Self::validate_config(schema, context)?;
        debug!(
            schema = schema.name(),
            path = context.path(),
            keys = data.len(),
            "Binding record"
        );

        let mut values = IndexMap::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = Self::bind_field(field, data, context)?;
            values.insert(field.name.clone(), value);
        }
        Ok(Record::new(Arc::clone(schema), values))
    }

    /// Every config entry at this level must name a field of `schema`
    fn validate_config(schema: &Schema, context: &BindContext) -> Result<()> {
        let unknown = context
            .config()
            .referenced_fields()
            .find(|(_, field)| !schema.has_field(field));

        match unknown {
            Some((parameter, field)) => Err(Report::new(Error::invalid_configuration(
                parameter,
                context.field(field).path(),
            ))
            .attach(format!("Schema '{}' has no such field", schema.name()))),
            None => Ok(()),
        }
    }

    fn bind_field(
        field: &FieldDescriptor,
        data: &Map<String, Value>,
        context: &BindContext,
    ) -> Result<BoundValue> {
        let config = context.config();
        let field_context = context.field(&field.name);

        if let Some(nested_schema) = field.declared_type.as_record() {
            if config.is_flattened(&field.name) {
                trace!(field_path = field_context.path(), "Binding flattened record");
                return Self::bind_record(nested_schema, data, &field_context)
                    .map(BoundValue::Record);
            }
            if let Some(prefix) = config.prefix_for(&field.name) {
                let stripped: Map<String, Value> = data
                    .iter()
                    .filter_map(|(key, value)| {
                        key.strip_prefix(prefix)
                            .map(|rest| (rest.to_string(), value.clone()))
                    })
                    .collect();
                if stripped.is_empty() {
                    return Self::missing(field, &field_context);
                }
                trace!(
                    field_path = field_context.path(),
                    prefix,
                    keys = stripped.len(),
                    "Binding prefixed record"
                );
                return Self::bind_record(nested_schema, &stripped, &field_context)
                    .map(BoundValue::Record);
            }
        }

        let value = match config.prefix_for(&field.name) {
            Some(prefix) => data
                .iter()
                .find_map(|(key, value)| key.strip_prefix(prefix).map(|_| value)),
            None => data.get(config.remapped_key(&field.name)),
        };
        let Some(value) = value else {
            return Self::missing(field, &field_context);
        };

        if config.is_cast(&field.name) {
            let coerced = cast::coerce(&field.declared_type, value);
            return Self::build_value(&field.declared_type, &coerced, &field_context);
        }
        Self::build_value(&field.declared_type, value, &field_context)
    }

    /// Value for a field whose key is absent
    fn missing(field: &FieldDescriptor, context: &BindContext) -> Result<BoundValue> {
        if let Some(default) = field.default.produce() {
            trace!(field_path = context.path(), "Using field default");
            return Ok(BoundValue::from_json(&default));
        }
        if field.declared_type.is_optional() {
            return Ok(BoundValue::None);
        }
        Err(Report::new(Error::missing_value(context.path())))
    }

    /// Check `value` against `declared_type` and convert it
    fn build_value(
        declared_type: &TypeExpr,
        value: &Value,
        context: &BindContext,
    ) -> Result<BoundValue> {
        match (declared_type, value) {
            (TypeExpr::Primitive(Primitive::Any), _) => Ok(BoundValue::from_json(value)),
            (TypeExpr::Primitive(Primitive::NoneType) | TypeExpr::Optional(_), Value::Null) => {
                Ok(BoundValue::None)
            }
            (TypeExpr::Primitive(Primitive::Bool), Value::Bool(b)) => Ok(BoundValue::Bool(*b)),
            (TypeExpr::Primitive(Primitive::Int), Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(BoundValue::Int(i)),
                None => context.mismatch(declared_type, value),
            },
            (TypeExpr::Primitive(Primitive::Float), Value::Number(n)) => match n.as_f64() {
                Some(f) => Ok(BoundValue::Float(f)),
                None => context.mismatch(declared_type, value),
            },
            (TypeExpr::Primitive(Primitive::Str), Value::String(s)) => {
                Ok(BoundValue::Str(s.clone()))
            }
            (TypeExpr::Optional(inner), _) => Self::build_value(inner, value, context),
            (TypeExpr::List(item_type), Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| Self::build_value(item_type, item, &context.element(index)))
                .collect::<Result<Vec<_>>>()
                .map(BoundValue::List),
            (TypeExpr::Map(value_type), Value::Object(entries)) => entries
                .iter()
                .map(|(key, entry)| {
                    Self::build_value(value_type, entry, &context.entry(key))
                        .map(|bound| (key.clone(), bound))
                })
                .collect::<Result<IndexMap<_, _>>>()
                .map(BoundValue::Map),
            (TypeExpr::Union(members), _) => {
                Self::build_union(declared_type, members, value, context)
            }
            (TypeExpr::Record(schema), Value::Object(nested)) => {
                Self::bind_record(schema, nested, context).map(BoundValue::Record)
            }
            _ => context.mismatch(declared_type, value),
        }
    }

    /// First member that accepts the value wins
    fn build_union(
        declared_type: &TypeExpr,
        members: &[TypeExpr],
        value: &Value,
        context: &BindContext,
    ) -> Result<BoundValue> {
        let strict = context.strict();
        if let Some(bound) = members
            .iter()
            .find_map(|member| Self::build_value(member, value, &strict).ok())
        {
            return Ok(bound);
        }

        if context.checks_types() {
            return Err(Report::new(Error::union_match(context.path(), declared_type)));
        }
        trace!(
            field_path = context.path(),
            union = %declared_type,
            "No union member matched; keeping untyped value"
        );
        Ok(BoundValue::from_json(value))
    }
}

//! Schema extension
//!
//! Given a record schema and the mapping about to be bound to it, synthesize a
//! schema that also has a field for every input key the original does not
//! claim. Record-typed fields are re-extended against their nested mappings
//! first, so unknown keys are captured at every depth.
//!
//! The result is built in three lists that are merged by name:
//! 1. every original field, made optional
//! 2. record fields whose nested schema was extended
//! 3. one optional field per unclaimed input key, typed from its value
//!
//! When lists 2 and 3 are empty the original schema is returned as is, so no
//! new schema is created for inputs that already fit.

mod assembler;
mod extra_fields;
mod field_wrapper;
mod key_resolver;
mod nested;


use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use self::key_resolver::KeyResolver;
use crate::config::Config;
use crate::schema::Schema;

/// Synthesize a schema able to hold every key of `data`
///
/// The returned schema is `schema` itself when there is nothing to add.
/// Otherwise it is a new schema named `<name>WithExtraFields` whose base is
/// `schema`, with all fields optional: the original ones first, in order, and
/// then one per unclaimed key of `data`, in input order.
///
/// Only the `remap` and `prefixed` tables of `config` are read here.
pub fn extend(schema: &Arc<Schema>, data: &Map<String, Value>, config: &Config) -> Arc<Schema> {
    let resolver = KeyResolver::new(data, config);
    let nested_fields = nested::extended_nested_fields(schema, &resolver, config);
    let extra_fields = extra_fields::extra_fields(schema, &resolver);

    if !nested_fields.is_empty() || !extra_fields.is_empty() {
        debug!(
            schema = schema.name(),
            nested = nested_fields.len(),
            extras = extra_fields.len(),
            "Synthesizing extended schema"
        );
    }

    assembler::assemble(schema, nested_fields, extra_fields)
}

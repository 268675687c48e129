//! Entry point: optional schema extension followed by binding

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::binder::{Binder, RecordBinder};
use crate::config::Config;
use crate::error::Result;
use crate::extend::extend;
use crate::record::Record;
use crate::schema::Schema;

/// Bind `data` to `schema` with the default [`RecordBinder`]
///
/// With `add_extra_fields`, the schema is first extended so that every key of
/// `data` lands in a field of the resulting record, at every nesting level.
/// `config` defaults to [`Config::default`].
///
/// # Errors
///
/// Any error of [`RecordBinder`].
pub fn bind(
    schema: &Arc<Schema>,
    data: &Map<String, Value>,
    config: Option<&Config>,
    add_extra_fields: bool,
) -> Result<Record> {
    bind_with(&RecordBinder, schema, data, config, add_extra_fields)
}

/// Same as [`bind`], delegating record construction to `binder`
///
/// The binder always receives the original `data`.
///
/// # Errors
///
/// Whatever `binder` reports, unchanged.
pub fn bind_with<B>(
    binder: &B,
    schema: &Arc<Schema>,
    data: &Map<String, Value>,
    config: Option<&Config>,
    add_extra_fields: bool,
) -> Result<Record>
where
    B: Binder + ?Sized,
{
    let config = config.map_or_else(|| Cow::Owned(Config::default()), Cow::Borrowed);

    let target = if add_extra_fields {
        extend(schema, data, &config)
    } else {
        Arc::clone(schema)
    };
    debug!(
        schema = schema.name(),
        target = target.name(),
        add_extra_fields,
        "Binding input mapping"
    );

    binder.bind_raw(&target, data, &config)
}

//! Bind string-keyed mappings to record schemas, capturing unknown keys
//!
//! Schemas are data: a [`Schema`] is a named list of typed fields, shared
//! through `Arc`. [`bind`] builds a [`Record`] of a schema from a JSON object.
//! When asked to keep extra fields it first calls [`extend`], which
//! synthesizes a schema named `<Name>WithExtraFields` holding every original
//! field (made optional) plus one optional field per input key the schema
//! does not know, at every nesting level.
//!
//! ```
//! use dict_bind::{Schema, TypeExpr, bind};
//! use serde_json::{Map, json};
//!
//! # fn main() -> dict_bind::Result<()> {
//! let schema = Schema::builder("X").field("i", TypeExpr::int()).build()?;
//! let data: Map<_, _> = [("i".to_string(), json!(42)), ("s".to_string(), json!("text"))]
//!     .into_iter()
//!     .collect();
//!
//! let record = bind(&schema, &data, None, true)?;
//! assert_eq!(record.schema().name(), "XWithExtraFields");
//! assert_eq!(record.get_str("s"), Some("text"));
//! assert!(record.is_instance_of(&schema));
//! # Ok(())
//! # }
//! ```

mod bind;
pub mod binder;
pub mod config;
mod constants;
pub mod error;
pub mod extend;
pub mod record;
pub mod schema;
pub mod support;

pub use self::bind::{bind, bind_with};
pub use self::binder::{Binder, RecordBinder};
pub use self::config::Config;
pub use self::constants::EXTENDED_SCHEMA_SUFFIX;
pub use self::error::{Error, Result};
pub use self::extend::extend;
pub use self::record::{BoundValue, Record};
pub use self::schema::{
    FieldDefault, FieldDescriptor, Primitive, Schema, SchemaBuilder, SchemaRegistry, TypeExpr,
};

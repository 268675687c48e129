//! Bound record instances
//!
//! A [`Record`] is what a binder produces: the schema it was bound against plus
//! one [`BoundValue`] per field, in schema order. Records built against an
//! extended schema carry that schema, so [`Record::is_instance_of`] also holds
//! for the original one.

use std::sync::Arc;

use error_stack::{Report, ResultExt};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::schema::Schema;

/// A value held by a record field
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// Absent / `null`
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// List of values
    List(Vec<BoundValue>),
    /// String-keyed mapping, in input order
    Map(IndexMap<String, BoundValue>),
    /// Nested record
    Record(Record),
}

impl BoundValue {
    /// Convert a JSON value without consulting any schema
    ///
    /// Objects become [`BoundValue::Map`]; nothing becomes a record.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| n.as_f64().map_or(Self::None, Self::Float), Self::Int),
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Back to JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::None => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Str(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Record(record) => record.to_json(),
        }
    }

    /// Whether this is [`BoundValue::None`]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The boolean, if this is one
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is one
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float, if this is one
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The items, if this is a list
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a mapping
    pub const fn as_map(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The nested record, if this is one
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl Serialize for BoundValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::None => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(entries) => serializer.collect_map(entries),
            Self::Record(record) => record.serialize(serializer),
        }
    }
}

/// An instance of a record schema
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: IndexMap<String, BoundValue>,
}

impl Record {
    pub(crate) const fn new(schema: Arc<Schema>, values: IndexMap<String, BoundValue>) -> Self {
        Self { schema, values }
    }

    /// The schema this record was bound against
    pub const fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Value of a field
    pub fn get(&self, field: &str) -> Option<&BoundValue> {
        self.values.get(field)
    }

    /// Integer value of a field
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(BoundValue::as_i64)
    }

    /// Float value of a field
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(BoundValue::as_f64)
    }

    /// Boolean value of a field
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(BoundValue::as_bool)
    }

    /// String value of a field
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(BoundValue::as_str)
    }

    /// Nested record held by a field
    pub fn get_record(&self, field: &str) -> Option<&Self> {
        self.get(field).and_then(BoundValue::as_record)
    }

    /// `(field name, value)` pairs in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Whether this record's schema is `schema` or was derived from it
    pub fn is_instance_of(&self, schema: &Schema) -> bool {
        self.schema.extends(schema)
    }

    /// The record as a JSON object, fields in schema order
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Deserialize the record into a statically typed value
    ///
    /// # Errors
    ///
    /// `InvalidData` when the record does not fit `T`.
    pub fn deserialize_into<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.to_json())
            .map_err(|source| {
                Report::new(Error::invalid_data(format!(
                    "record '{}' does not fit {}: {source}",
                    self.schema.name(),
                    std::any::type_name::<T>()
                )))
            })
            .attach(format!("Fields: {}", self.values.keys().join(", ")))
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(&self.values)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::schema::TypeExpr;

    fn point_record() -> Record {
        let schema = Schema::builder("Point")
            .field("x", TypeExpr::int())
            .field("y", TypeExpr::float())
            .field("label", TypeExpr::optional(TypeExpr::str()))
            .build()
            .unwrap();
        let values = IndexMap::from([
            ("x".to_string(), BoundValue::Int(1)),
            ("y".to_string(), BoundValue::Float(2.5)),
            ("label".to_string(), BoundValue::None),
        ]);
        Record::new(schema, values)
    }

    #[test]
    fn test_typed_getters() {
        let record = point_record();
        assert_eq!(record.get_i64("x"), Some(1));
        assert_eq!(record.get_f64("y"), Some(2.5));
        assert_eq!(record.get_f64("x"), None, "no implicit int to float view");
        assert!(record.get("label").unwrap().is_none());
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_to_json_keeps_field_order() {
        let record = point_record();
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"x":1,"y":2.5,"label":null}"#);
        assert_eq!(record.to_json(), json!({ "x": 1, "y": 2.5, "label": null }));
    }

    #[test]
    fn test_deserialize_into_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Point {
            x:     i64,
            y:     f64,
            label: Option<String>,
        }

        let point: Point = point_record().deserialize_into().unwrap();
        assert_eq!(
            point,
            Point {
                x:     1,
                y:     2.5,
                label: None,
            }
        );
    }

    #[test]
    fn test_deserialize_into_mismatch_is_invalid_data() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code, reason = "only the failure matters")]
        struct Named {
            name: String,
        }

        let report = point_record().deserialize_into::<Named>().unwrap_err();
        assert!(matches!(report.current_context(), Error::InvalidData(_)));
    }

    #[test]
    fn test_from_json_is_untyped() {
        let value = BoundValue::from_json(&json!({ "a": [1, 2.5, "s"], "b": null }));
        let map = value.as_map().unwrap();
        assert_eq!(
            map["a"].as_list().unwrap(),
            &[BoundValue::Int(1), BoundValue::Float(2.5), BoundValue::Str("s".into())]
        );
        assert!(map["b"].is_none());
        assert_eq!(value.to_json(), json!({ "a": [1, 2.5, "s"], "b": null }));
    }
}

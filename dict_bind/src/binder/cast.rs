//! Conversions applied to `cast` fields before type checking

use std::borrow::Cow;

use serde_json::{Number, Value};

use crate::schema::{Primitive, TypeExpr};

/// Convert `value` to the representation of `target`, when a conversion exists
///
/// Only primitive targets (behind one level of optional) are converted:
/// strings parse into numbers and booleans, and numbers and booleans print
/// into strings. Anything else is returned untouched and left for the type
/// check to judge.
pub(super) fn coerce<'v>(target: &TypeExpr, value: &'v Value) -> Cow<'v, Value> {
    let TypeExpr::Primitive(primitive) = target.strip_optional() else {
        return Cow::Borrowed(value);
    };

    let converted = match (primitive, value) {
        (Primitive::Int, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (Primitive::Int, Value::Bool(b)) => Some(Value::from(i64::from(*b))),
        (Primitive::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (Primitive::Bool, Value::String(s)) => parse_bool(s).map(Value::Bool),
        (Primitive::Bool, Value::Number(n)) => n.as_i64().map(|i| Value::Bool(i != 0)),
        (Primitive::Str, Value::Number(n)) => Some(Value::String(n.to_string())),
        (Primitive::Str, Value::Bool(b)) => Some(Value::String(b.to_string())),
        _ => None,
    };

    converted.map_or(Cow::Borrowed(value), Cow::Owned)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

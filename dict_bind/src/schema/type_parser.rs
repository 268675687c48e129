//! Parser for type expressions
//!
//! Accepts the same text `TypeExpr` displays as:
//! - `int`, `float`, `bool`, `str`, `none`, `any`
//! - `list<int>`, `map<str>`, `optional<X>`
//! - `union<int, str, none>`
//! - any schema name registered in a `SchemaRegistry`

use std::sync::Arc;

use error_stack::Report;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, opt};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair};
use nom::{IResult, Parser};
use strum::{Display, EnumString};

use super::{Primitive, SchemaRegistry, TypeExpr};
use crate::error::{Error, Result};

/// Generic type constructors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
enum Constructor {
    List,
    Map,
    Optional,
    Union,
}

/// Unresolved syntax tree: a name with optional type arguments
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeNode<'a> {
    name:      &'a str,
    arguments: Vec<TypeNode<'a>>,
}

/// Parse an identifier (alphanumeric + underscore)
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_').parse(input)
}

/// Parse `name` or `name<arg, ...>`, with surrounding whitespace
fn type_node(input: &str) -> IResult<&str, TypeNode<'_>> {
    let arguments = delimited(char('<'), separated_list1(char(','), type_node), char('>'));
    map(
        delimited(multispace0, pair(identifier, opt(arguments)), multispace0),
        |(name, arguments)| TypeNode {
            name,
            arguments: arguments.unwrap_or_default(),
        },
    )
    .parse(input)
}

fn resolve(node: &TypeNode<'_>, registry: &SchemaRegistry) -> Result<TypeExpr> {
    let Ok(constructor) = node.name.parse::<Constructor>() else {
        if !node.arguments.is_empty() {
            return Err(Report::new(Error::InvalidTypeExpression(format!(
                "'{}' does not take type arguments",
                node.name
            ))));
        }
        return resolve_name(node.name, registry);
    };

    let arguments = node
        .arguments
        .iter()
        .map(|argument| resolve(argument, registry))
        .collect::<Result<Vec<_>>>()?;

    match (constructor, <[TypeExpr; 1]>::try_from(arguments)) {
        (Constructor::List, Ok([item])) => Ok(TypeExpr::list(item)),
        (Constructor::Map, Ok([value])) => Ok(TypeExpr::map(value)),
        (Constructor::Optional, Ok([inner])) => Ok(TypeExpr::optional(inner)),
        (Constructor::Union, Ok([only])) => Ok(TypeExpr::union(vec![only])),
        (Constructor::Union, Err(members)) if !members.is_empty() => {
            Ok(TypeExpr::union(members))
        }
        (constructor, _) => Err(Report::new(Error::InvalidTypeExpression(format!(
            "'{constructor}' takes exactly one type argument, got {}",
            node.arguments.len()
        )))),
    }
}

fn resolve_name(name: &str, registry: &SchemaRegistry) -> Result<TypeExpr> {
    if let Ok(primitive) = name.parse::<Primitive>() {
        return Ok(TypeExpr::Primitive(primitive));
    }
    registry
        .get(name)
        .map(|schema| TypeExpr::Record(Arc::clone(schema)))
        .ok_or_else(|| Report::new(Error::UnknownSchema(name.to_string())))
}

/// Parse a complete type expression, resolving record names through `registry`
///
/// # Errors
///
/// `InvalidTypeExpression` for bad syntax or arity, `UnknownSchema` for an
/// unregistered record name.
pub fn parse_type_expr(input: &str, registry: &SchemaRegistry) -> Result<TypeExpr> {
    match all_consuming(type_node).parse(input) {
        Ok((_, node)) => resolve(&node, registry),
        Err(e) => Err(Report::new(Error::InvalidTypeExpression(format!(
            "failed to parse '{input}': {e}"
        )))),
    }
}

impl TypeExpr {
    /// Parse a type expression such as `optional<list<X>>`
    ///
    /// Record names are looked up in `registry`.
    ///
    /// # Errors
    ///
    /// See [`parse_type_expr`].
    pub fn parse(input: &str, registry: &SchemaRegistry) -> Result<Self> {
        parse_type_expr(input, registry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn registry_with_x() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(Schema::builder("X").field("i", TypeExpr::int()).build().unwrap());
        registry
    }

    #[test]
    fn test_primitives() {
        let registry = SchemaRegistry::new();
        assert_eq!(TypeExpr::parse("int", &registry).unwrap(), TypeExpr::int());
        assert_eq!(TypeExpr::parse("  str ", &registry).unwrap(), TypeExpr::str());
        assert_eq!(TypeExpr::parse("none", &registry).unwrap(), TypeExpr::none());
    }

    #[test]
    fn test_nested_generics() {
        let registry = registry_with_x();
        let parsed = TypeExpr::parse("optional<list<X>>", &registry).unwrap();
        assert_eq!(parsed.to_string(), "optional<list<X>>");

        let union = TypeExpr::parse("union<int, str,none>", &registry).unwrap();
        assert_eq!(union.to_string(), "union<int, str, none>");
        assert!(union.is_optional());
    }

    #[test]
    fn test_display_round_trips() {
        let registry = registry_with_x();
        for text in ["map<list<float>>", "optional<X>", "union<X, bool>", "any"] {
            let parsed = TypeExpr::parse(text, &registry).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_unknown_schema() {
        let report = TypeExpr::parse("list<Y>", &registry_with_x()).unwrap_err();
        assert_eq!(report.current_context(), &Error::UnknownSchema("Y".to_string()));
    }

    #[test]
    fn test_arity_and_syntax_errors() {
        let registry = SchemaRegistry::new();
        for text in ["list<int, str>", "int<str>", "list<", "", "union<>"] {
            let report = TypeExpr::parse(text, &registry).unwrap_err();
            assert!(
                matches!(report.current_context(), Error::InvalidTypeExpression(_)),
                "expected syntax error for {text:?}, got {:?}",
                report.current_context()
            );
        }
    }
}

//! Crate-wide error type

use error_stack::Report;
use thiserror::Error;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_INVALID_PREFIX: &str = "Invalid";

/// Result type for the `dict_bind` library
pub type Result<T> = std::result::Result<T, Report<Error>>;

/// Error categories reported while defining schemas, loading configuration, or binding data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A configuration or schema document could not be read or parsed
    #[error("{0}")]
    Load(String),

    /// A configuration parameter names a field the schema does not have
    #[error("Invalid configuration: {parameter} refers to unknown field '{field}'")]
    InvalidConfiguration {
        /// Which configuration table held the entry (`remap`, `prefixed`, ...)
        parameter: String,
        /// The offending field name
        field:     String,
    },

    /// Bound data could not be used as requested
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A schema definition was rejected
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A type expression could not be parsed
    #[error("Invalid type expression: {0}")]
    InvalidTypeExpression(String),

    /// A required field had no value, no default and was not optional
    #[error("Missing value for field '{field_path}'")]
    MissingValue {
        /// Dotted path of the field from the root record
        field_path: String,
    },

    /// No member of a union type accepted the value
    #[error("Cannot match value of field '{field_path}' to any of {types}")]
    UnionMatch {
        /// Dotted path of the field from the root record
        field_path: String,
        /// Display form of the union's members
        types:      String,
    },

    /// A type expression referred to a schema name nobody registered
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// A value did not have the declared type
    #[error("Wrong value type for field '{field_path}': expected {expected}, found {found}")]
    WrongType {
        /// Dotted path of the field from the root record
        field_path: String,
        /// Display form of the declared type
        expected:   String,
        /// Kind of the value that was found
        found:      String,
    },
}

impl Error {
    /// Create a "Failed to X" load error
    pub fn failed_to(action: &str, details: impl std::fmt::Display) -> Self {
        Self::Load(format!("{MSG_FAILED_TO_PREFIX} {action}: {details}"))
    }

    /// Create an "Invalid X" schema error
    pub fn invalid_schema(what: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidSchema(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create an invalid-data error
    pub fn invalid_data(details: impl Into<String>) -> Self {
        Self::InvalidData(details.into())
    }

    /// Create an invalid-configuration error for `parameter` naming `field`
    pub fn invalid_configuration(parameter: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            field:     field.into(),
        }
    }

    /// Create a missing-value error
    pub fn missing_value(field_path: impl Into<String>) -> Self {
        Self::MissingValue {
            field_path: field_path.into(),
        }
    }

    /// Create a union-match error
    pub fn union_match(field_path: impl Into<String>, types: impl std::fmt::Display) -> Self {
        Self::UnionMatch {
            field_path: field_path.into(),
            types:      types.to_string(),
        }
    }

    /// Create a wrong-type error
    pub fn wrong_type(
        field_path: impl Into<String>,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        Self::WrongType {
            field_path: field_path.into(),
            expected:   expected.to_string(),
            found:      found.to_string(),
        }
    }

    /// Field path carried by binding errors, if any
    pub fn field_path(&self) -> Option<&str> {
        match self {
            Self::MissingValue { field_path }
            | Self::UnionMatch { field_path, .. }
            | Self::WrongType { field_path, .. } => Some(field_path),
            Self::Load(_)
            | Self::InvalidConfiguration { .. }
            | Self::InvalidData(_)
            | Self::InvalidSchema(_)
            | Self::InvalidTypeExpression(_)
            | Self::UnknownSchema(_) => None,
        }
    }
}

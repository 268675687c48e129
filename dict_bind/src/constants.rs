//! Shared constants

/// Suffix appended to a schema's name when extra fields are synthesized for it
pub const EXTENDED_SCHEMA_SUFFIX: &str = "WithExtraFields";

/// Separator between path segments in nested config keys and error field paths
pub const FIELD_PATH_SEPARATOR: char = '.';

// Config parameter names, reported in `InvalidConfiguration` errors
pub const PARAM_CAST: &str = "cast";
pub const PARAM_FLATTENED: &str = "flattened";
pub const PARAM_PREFIXED: &str = "prefixed";
pub const PARAM_REMAP: &str = "remap";

//! Schema registry: loads the built-in dataset descriptors from embedded
//! TOML configs.
//!
//! Each `.toml` file in `packages/source/schemas/` is baked into the binary
//! at compile time via [`include_str!`]. Supporting a new dataset revision
//! is as simple as creating a new TOML file and adding it to the list below.

use std::path::Path;

use crate::SourceError;
use crate::schema::{SchemaDefinition, parse_schema_toml};

/// Identifier of the default hate-crime incident schema.
pub const DEFAULT_INCIDENT_SCHEMA: &str = "fbi_hate_crime";

/// Identifier of the default COVID-19 case schema.
pub const DEFAULT_CASE_SCHEMA: &str = "covid_tracking_col19";

/// TOML configs embedded at compile time.
const SCHEMA_TOMLS: &[(&str, &str)] = &[
    ("fbi_hate_crime", include_str!("../schemas/fbi_hate_crime.toml")),
    (
        "covid_tracking_col19",
        include_str!("../schemas/covid_tracking_col19.toml"),
    ),
    (
        "covid_tracking_col21",
        include_str!("../schemas/covid_tracking_col21.toml"),
    ),
    (
        "covid_tracking_named",
        include_str!("../schemas/covid_tracking_named.toml"),
    ),
];

/// Total number of built-in schemas (used in tests).
#[cfg(test)]
const EXPECTED_SCHEMA_COUNT: usize = 4;

/// Returns all built-in schema definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_schemas() -> Vec<SchemaDefinition> {
    SCHEMA_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_schema_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a built-in schema by identifier.
///
/// # Errors
///
/// Returns [`SourceError::UnknownSchema`] if no built-in schema has the
/// given identifier.
pub fn schema_by_id(id: &str) -> Result<SchemaDefinition, SourceError> {
    all_schemas()
        .into_iter()
        .find(|schema| schema.id == id)
        .ok_or_else(|| SourceError::UnknownSchema { id: id.to_string() })
}

/// Loads a user-supplied schema descriptor from disk.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or is not a valid
/// schema.
pub fn load_schema_file(path: &Path) -> Result<SchemaDefinition, SourceError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schema_toml(&contents)
}

/// Resolves a schema argument: a path to an existing `.toml` file is loaded
/// from disk, anything else is treated as a built-in identifier.
///
/// # Errors
///
/// Returns [`SourceError`] if the file is invalid or the identifier is
/// unknown.
pub fn resolve_schema(id_or_path: &str) -> Result<SchemaDefinition, SourceError> {
    let path = Path::new(id_or_path);
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
        && path.is_file()
    {
        log::debug!("Loading schema from {}", path.display());
        return load_schema_file(path);
    }
    schema_by_id(id_or_path)
}

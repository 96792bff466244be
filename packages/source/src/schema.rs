//! Config-driven dataset schema descriptors.
//!
//! A [`SchemaDefinition`] captures everything that varies between revisions
//! of an input file: which logical field lives in which column, how dates
//! are formatted, and what to do with rows for places outside the 50
//! states. One generic reader handles every revision, so column drift
//! between dataset releases is a config change rather than a code change.

use std::collections::BTreeMap;

use serde::Deserialize;
use strum_macros::{AsRefStr, Display};

use crate::SourceError;

/// Logical column holding the incident identifier.
pub const COLUMN_INCIDENT_ID: &str = "incident_id";

/// Logical column holding the two-letter state code.
pub const COLUMN_STATE: &str = "state";

/// Logical column holding the record date.
pub const COLUMN_DATE: &str = "date";

/// Logical column holding the daily case count.
pub const COLUMN_CASES: &str = "cases";

/// A complete dataset schema descriptor, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDefinition {
    /// Unique identifier (e.g., `"fbi_hate_crime"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Which record type rows of this dataset become.
    pub kind: DatasetKind,
    /// `chrono` format string for the date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Field delimiter (default: comma).
    pub delimiter: Option<String>,
    /// Whether the first row is a header row.
    #[serde(default = "default_has_headers")]
    pub has_headers: bool,
    /// What to do with rows whose state code is not one of the 50 states.
    #[serde(default)]
    pub unknown_states: UnknownStatePolicy,
    /// Logical column name to physical column mapping.
    pub columns: BTreeMap<String, ColumnRef>,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

const fn default_has_headers() -> bool {
    true
}

/// The record type a dataset produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Hate-crime incidents.
    Incidents,
    /// Daily COVID-19 case counts.
    Cases,
}

impl DatasetKind {
    /// Logical columns every schema of this kind must map.
    #[must_use]
    pub const fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Incidents => &[COLUMN_INCIDENT_ID, COLUMN_STATE, COLUMN_DATE],
            Self::Cases => &[COLUMN_DATE, COLUMN_STATE, COLUMN_CASES],
        }
    }
}

/// Handling for rows whose state code is not one of the 50 states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnknownStatePolicy {
    /// Fail the read with [`SourceError::UnknownState`].
    #[default]
    Reject,
    /// Drop the row, log it, and count it in the read summary.
    Skip,
}

/// Where a logical column lives in the file.
///
/// In TOML a bare integer is a zero-based column index and a bare string
/// is a header name:
///
/// ```toml
/// [columns]
/// date = 0
/// cases = "positiveIncrease"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    /// Zero-based column position.
    Index(usize),
    /// Header name, matched after trimming whitespace.
    Header(String),
}

/// Column positions after resolving header names against a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    positions: BTreeMap<String, usize>,
}

impl ResolvedColumns {
    /// Returns the physical position of a logical column.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

impl SchemaDefinition {
    /// Checks that every column required by the dataset kind is mapped and
    /// that header references are only used on files with headers.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Schema`] describing the first problem found.
    pub fn validate(&self) -> Result<(), SourceError> {
        for column in self.kind.required_columns() {
            if !self.columns.contains_key(*column) {
                return Err(SourceError::Schema {
                    message: format!("{}: missing required column '{column}'", self.id),
                });
            }
        }

        if !self.has_headers
            && let Some((name, _)) = self
                .columns
                .iter()
                .find(|(_, col)| matches!(col, ColumnRef::Header(_)))
        {
            return Err(SourceError::Schema {
                message: format!(
                    "{}: column '{name}' is referenced by header but the file has no header row",
                    self.id
                ),
            });
        }

        if let Some(delim) = &self.delimiter
            && delim.len() != 1
        {
            return Err(SourceError::Schema {
                message: format!("{}: delimiter must be a single byte, got {delim:?}", self.id),
            });
        }

        Ok(())
    }

    /// Returns the delimiter byte (comma if unset).
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter
            .as_deref()
            .and_then(|d| d.as_bytes().first().copied())
            .unwrap_or(b',')
    }

    /// Resolves every mapped column to a physical position.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Schema`] if a header-named column is not
    /// present in `headers`.
    pub fn resolve_columns(
        &self,
        headers: Option<&csv::StringRecord>,
    ) -> Result<ResolvedColumns, SourceError> {
        let mut positions = BTreeMap::new();

        for (name, column) in &self.columns {
            let position = match column {
                ColumnRef::Index(index) => *index,
                ColumnRef::Header(header) => headers
                    .and_then(|row| row.iter().position(|h| h.trim() == header))
                    .ok_or_else(|| SourceError::Schema {
                        message: format!(
                            "{}: header '{header}' for column '{name}' not found",
                            self.id
                        ),
                    })?,
            };
            positions.insert(name.clone(), position);
        }

        Ok(ResolvedColumns { positions })
    }
}

/// Parses a TOML string into a validated [`SchemaDefinition`].
///
/// # Errors
///
/// Returns [`SourceError::Schema`] if the TOML is malformed or the schema
/// fails validation.
pub fn parse_schema_toml(toml_str: &str) -> Result<SchemaDefinition, SourceError> {
    let schema: SchemaDefinition = toml::from_str(toml_str).map_err(|e| SourceError::Schema {
        message: e.to_string(),
    })?;
    schema.validate()?;
    Ok(schema)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Schema-driven readers for the hate-crime and COVID-19 case datasets.
//!
//! Every input file is described by a [`schema::SchemaDefinition`] that maps
//! logical columns to physical ones. Built-in descriptors for the known
//! dataset revisions live in [`registry`]; users can supply their own.

pub mod parsing;
pub mod progress;
pub mod reader;
pub mod registry;
pub mod schema;

use std::path::PathBuf;

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The input file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer could not decode the file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A schema descriptor is malformed or does not fit the file.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },

    /// No schema with the requested identifier exists.
    #[error("Unknown schema: {id}")]
    UnknownSchema {
        /// The requested identifier.
        id: String,
    },

    /// A data row does not have the shape the schema promises.
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// One-based line number in the input file.
        line: u64,
        /// Description of what is wrong with the row.
        reason: String,
    },

    /// A data row names a state outside the 50 states.
    #[error("Unknown state code '{code}' at line {line}")]
    UnknownState {
        /// One-based line number in the input file.
        line: u64,
        /// The normalized code that was rejected.
        code: String,
    },
}

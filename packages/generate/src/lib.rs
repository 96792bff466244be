#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Output generation for the analysis pipeline.
//!
//! [`export`] writes (and reads back) the per-state percent-difference
//! table. [`charts`] builds Plotly figure documents and wraps them in
//! standalone HTML pages. Every file is written to a `.tmp` sibling first
//! and renamed into place, so an interrupted run never leaves a truncated
//! output behind.

pub mod charts;
pub mod export;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while generating outputs.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Reading or writing an output file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes `contents` to `path` through a temporary sibling file.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] if the write or rename fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, contents).map_err(|source| GenerateError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

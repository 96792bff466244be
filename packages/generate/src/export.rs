//! The percent-difference CSV table.
//!
//! Header: `State,Percent Difference,Actual,Predicted`. A percent
//! difference that is undefined (zero prediction) is written as `NaN` and
//! read back as [`f64::NAN`].

use std::io::{Read, Write};
use std::path::Path;

use hate_trend_analytics_models::PredictionResult;
use hate_trend_state_models::UsState;
use serde::{Deserialize, Serialize};

use crate::{GenerateError, write_atomic};

#[derive(Debug, Serialize, Deserialize)]
struct PercentDiffRow {
    #[serde(rename = "State")]
    state: UsState,
    #[serde(rename = "Percent Difference")]
    percent_difference: f64,
    #[serde(rename = "Actual")]
    actual: u64,
    #[serde(rename = "Predicted")]
    predicted: i64,
}

impl From<&PredictionResult> for PercentDiffRow {
    fn from(result: &PredictionResult) -> Self {
        Self {
            state: result.state,
            percent_difference: result.percent_difference,
            actual: result.actual_count,
            predicted: result.predicted_count,
        }
    }
}

impl From<PercentDiffRow> for PredictionResult {
    fn from(row: PercentDiffRow) -> Self {
        Self {
            state: row.state,
            percent_difference: row.percent_difference,
            actual_count: row.actual,
            predicted_count: row.predicted,
        }
    }
}

/// Writes the table to any writer.
///
/// # Errors
///
/// Returns [`GenerateError::Csv`] if a row cannot be written.
pub fn write_percent_diff<W: Write>(
    writer: W,
    results: &[PredictionResult],
) -> Result<(), GenerateError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for result in results {
        csv_writer.serialize(PercentDiffRow::from(result))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads a table produced by [`write_percent_diff`].
///
/// # Errors
///
/// Returns [`GenerateError::Csv`] if a row is malformed or names an
/// unknown state.
pub fn read_percent_diff<R: Read>(reader: R) -> Result<Vec<PredictionResult>, GenerateError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<PercentDiffRow>()
        .map(|row| row.map(PredictionResult::from).map_err(GenerateError::from))
        .collect()
}

/// Writes the table to `path`.
///
/// # Errors
///
/// Returns an error if encoding or writing the file fails.
pub fn write_percent_diff_csv(path: &Path, results: &[PredictionResult]) -> Result<(), GenerateError> {
    let mut buffer = Vec::new();
    write_percent_diff(&mut buffer, results)?;
    write_atomic(path, &buffer)?;
    log::info!("Wrote {} rows to {}", results.len(), path.display());
    Ok(())
}

/// Reads the table from `path`.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] if the file cannot be opened, or
/// [`GenerateError::Csv`] if its contents are malformed.
pub fn read_percent_diff_csv(path: &Path) -> Result<Vec<PredictionResult>, GenerateError> {
    let file = std::fs::File::open(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let results = read_percent_diff(file)?;
    log::debug!("Read {} rows from {}", results.len(), path.display());
    Ok(results)
}

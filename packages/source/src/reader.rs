//! Schema-driven CSV reader.
//!
//! A single generic row loop serves both datasets. The [`SchemaDefinition`]
//! decides where each logical column lives; the per-kind converters decide
//! how a row becomes an [`Incident`] or a [`CaseRecord`] and which rows are
//! skipped rather than rejected.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use hate_trend_incident_models::{CaseRecord, Incident};
use hate_trend_state_models::UsState;
use serde::Serialize;

use crate::SourceError;
use crate::parsing::{parse_count, parse_date, parse_identifier};
use crate::progress::ProgressCallback;
use crate::schema::{
    COLUMN_CASES, COLUMN_DATE, COLUMN_INCIDENT_ID, COLUMN_STATE, DatasetKind, ResolvedColumns,
    SchemaDefinition, UnknownStatePolicy,
};

/// Rows between progress updates.
const PROGRESS_BATCH: u64 = 1_000;

/// Row accounting for a completed read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadSummary {
    /// Data rows read (header excluded).
    pub rows: u64,
    /// Rows turned into records.
    pub kept: u64,
    /// Rows dropped because their state is not one of the 50 states.
    pub skipped_unknown_state: u64,
    /// Rows dropped because their date is outside the dataset's coverage.
    pub skipped_out_of_window: u64,
    /// Negative daily counts (data corrections) recorded as zero.
    pub clamped_counts: u64,
}

/// Records read from one file together with their row accounting.
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    /// Records in file order.
    pub records: Vec<T>,
    /// Row accounting for the read.
    pub summary: ReadSummary,
}

/// One data row with its resolved column positions.
struct Row<'a> {
    schema: &'a SchemaDefinition,
    columns: &'a ResolvedColumns,
    record: &'a csv::StringRecord,
    line: u64,
}

impl Row<'_> {
    fn malformed(&self, reason: String) -> SourceError {
        SourceError::MalformedRecord {
            line: self.line,
            reason,
        }
    }

    fn field(&self, column: &str) -> Result<&str, SourceError> {
        let position = self
            .columns
            .position(column)
            .ok_or_else(|| SourceError::Schema {
                message: format!("{}: column '{column}' is not mapped", self.schema.id),
            })?;

        self.record.get(position).ok_or_else(|| {
            self.malformed(format!(
                "column '{column}' expected at position {position} but row has {} fields",
                self.record.len()
            ))
        })
    }

    /// Returns `None` if the row should be skipped under
    /// [`UnknownStatePolicy::Skip`].
    fn state(&self, summary: &mut ReadSummary) -> Result<Option<UsState>, SourceError> {
        let raw = self.field(COLUMN_STATE)?;
        match UsState::from_code(raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => match self.schema.unknown_states {
                UnknownStatePolicy::Reject => Err(SourceError::UnknownState {
                    line: self.line,
                    code: e.code,
                }),
                UnknownStatePolicy::Skip => {
                    log::trace!("[{}] line {}: skipping {e}", self.schema.id, self.line);
                    summary.skipped_unknown_state += 1;
                    Ok(None)
                }
            },
        }
    }

    fn date(&self) -> Result<NaiveDate, SourceError> {
        let raw = self.field(COLUMN_DATE)?;
        parse_date(raw, &self.schema.date_format).ok_or_else(|| {
            self.malformed(format!(
                "date '{raw}' does not match format '{}'",
                self.schema.date_format
            ))
        })
    }
}

/// Reads hate-crime incidents from any CSV source.
///
/// Rows dated before the incident coverage window are skipped and counted.
///
/// # Errors
///
/// Returns [`SourceError`] if the schema does not describe incidents, the
/// CSV is unreadable, a row is malformed, or a state code is rejected.
pub fn read_incidents<R: Read>(
    schema: &SchemaDefinition,
    input: R,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset<Incident>, SourceError> {
    read_rows(schema, input, DatasetKind::Incidents, progress, |row, summary| {
        let raw_id = row.field(COLUMN_INCIDENT_ID)?;
        let id = parse_identifier(raw_id).ok_or_else(|| {
            row.malformed(format!("incident id '{raw_id}' is not a non-negative integer"))
        })?;
        let Some(state) = row.state(summary)? else {
            return Ok(None);
        };
        let date = row.date()?;

        match Incident::new(id, state, date) {
            Ok(incident) => Ok(Some(incident)),
            Err(e) => {
                log::trace!("[{}] line {}: skipping {e}", row.schema.id, row.line);
                summary.skipped_out_of_window += 1;
                Ok(None)
            }
        }
    })
}

/// Reads daily COVID-19 case counts from any CSV source.
///
/// Rows outside the reporting year are skipped and counted. Empty count
/// cells are zero; negative counts are recorded as zero and counted.
///
/// # Errors
///
/// Returns [`SourceError`] if the schema does not describe cases, the CSV
/// is unreadable, a row is malformed, or a state code is rejected.
pub fn read_cases<R: Read>(
    schema: &SchemaDefinition,
    input: R,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset<CaseRecord>, SourceError> {
    read_rows(schema, input, DatasetKind::Cases, progress, |row, summary| {
        let date = row.date()?;
        let Some(state) = row.state(summary)? else {
            return Ok(None);
        };
        let raw_count = row.field(COLUMN_CASES)?;
        let count = parse_count(raw_count)
            .ok_or_else(|| row.malformed(format!("case count '{raw_count}' is not an integer")))?;
        let count = u64::try_from(count).unwrap_or_else(|_| {
            log::debug!(
                "[{}] line {}: negative case count {count} recorded as 0",
                row.schema.id,
                row.line
            );
            summary.clamped_counts += 1;
            0
        });

        match CaseRecord::new(date, state, count) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                log::trace!("[{}] line {}: skipping {e}", row.schema.id, row.line);
                summary.skipped_out_of_window += 1;
                Ok(None)
            }
        }
    })
}

/// Opens `path` and reads incidents from it.
///
/// # Errors
///
/// Returns [`SourceError::Open`] if the file cannot be opened, otherwise
/// see [`read_incidents`].
pub fn read_incidents_from_path(
    schema: &SchemaDefinition,
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset<Incident>, SourceError> {
    log::info!("[{}] Reading incidents from {}", schema.id, path.display());
    read_incidents(schema, open(path)?, progress)
}

/// Opens `path` and reads case records from it.
///
/// # Errors
///
/// Returns [`SourceError::Open`] if the file cannot be opened, otherwise
/// see [`read_cases`].
pub fn read_cases_from_path(
    schema: &SchemaDefinition,
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset<CaseRecord>, SourceError> {
    log::info!("[{}] Reading case counts from {}", schema.id, path.display());
    read_cases(schema, open(path)?, progress)
}

fn open(path: &Path) -> Result<File, SourceError> {
    File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn read_rows<R, T, F>(
    schema: &SchemaDefinition,
    input: R,
    expected: DatasetKind,
    progress: &Arc<dyn ProgressCallback>,
    mut convert: F,
) -> Result<Dataset<T>, SourceError>
where
    R: Read,
    F: FnMut(&Row<'_>, &mut ReadSummary) -> Result<Option<T>, SourceError>,
{
    if schema.kind != expected {
        return Err(SourceError::Schema {
            message: format!(
                "{}: schema describes {} but {expected} were requested",
                schema.id, schema.kind
            ),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(schema.delimiter_byte())
        .has_headers(schema.has_headers)
        .flexible(true)
        .from_reader(input);

    let headers = if schema.has_headers {
        Some(reader.headers()?.clone())
    } else {
        None
    };
    let columns = schema.resolve_columns(headers.as_ref())?;

    progress.set_message(format!("Reading {}", schema.name));

    let mut summary = ReadSummary::default();
    let mut records = Vec::new();
    let mut record = csv::StringRecord::new();

    while reader.read_record(&mut record)? {
        summary.rows += 1;
        let line = record
            .position()
            .map_or(summary.rows, csv::Position::line);
        let row = Row {
            schema,
            columns: &columns,
            record: &record,
            line,
        };

        if let Some(value) = convert(&row, &mut summary)? {
            records.push(value);
            summary.kept += 1;
        }

        if summary.rows % PROGRESS_BATCH == 0 {
            progress.inc(PROGRESS_BATCH);
        }
    }
    progress.inc(summary.rows % PROGRESS_BATCH);

    log::info!(
        "[{}] {} rows: {} kept, {} unknown state, {} out of window, {} negative counts",
        schema.id,
        summary.rows,
        summary.kept,
        summary.skipped_unknown_state,
        summary.skipped_out_of_window,
        summary.clamped_counts
    );
    progress.finish(format!("[{}] {} records", schema.id, summary.kept));

    Ok(Dataset { records, summary })
}

#[cfg(test)]
mod tests {
    use chrono::Datelike as _;

    use super::*;
    use crate::progress::null_progress;
    use crate::schema::parse_schema_toml;

    fn incident_schema(policy: &str) -> SchemaDefinition {
        parse_schema_toml(&format!(
            r#"
            id = "incidents"
            name = "Incidents"
            kind = "incidents"
            unknown_states = "{policy}"

            [columns]
            incident_id = 0
            state = 2
            date = 3
            "#
        ))
        .unwrap()
    }

    fn case_schema(cases: &str) -> SchemaDefinition {
        parse_schema_toml(&format!(
            r#"
            id = "cases"
            name = "Cases"
            kind = "cases"
            unknown_states = "skip"

            [columns]
            date = 0
            state = 1
            cases = {cases}
            "#
        ))
        .unwrap()
    }

    const INCIDENTS_CSV: &str = "\
INCIDENT_ID,AGENCY,STATE_ABBR,INCIDENT_DATE
1,Birmingham,AL,2019-03-04
2,Montgomery,al,2020-11-30
3,Omaha,NB,2005-07-01
4,Mobile,AL,1998-12-31
";

    #[test]
    fn reads_incidents_and_canonicalizes_states() {
        let schema = incident_schema("reject");
        let dataset = read_incidents(&schema, INCIDENTS_CSV.as_bytes(), &null_progress()).unwrap();

        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.records[1].state(), UsState::Alabama);
        assert_eq!(dataset.records[2].state(), UsState::Nebraska);
        assert_eq!(dataset.records[2].occurred_on().year(), 2005);
        assert_eq!(
            dataset.summary,
            ReadSummary {
                rows: 4,
                kept: 3,
                skipped_out_of_window: 1,
                ..ReadSummary::default()
            }
        );
    }

    #[test]
    fn rejects_unknown_state_under_reject_policy() {
        let csv_data = "ID,AGENCY,STATE,DATE\n1,Guam PD,GU,2019-01-01\n";
        let err = read_incidents(&incident_schema("reject"), csv_data.as_bytes(), &null_progress())
            .unwrap_err();
        match err {
            SourceError::UnknownState { line, code } => {
                assert_eq!(line, 2);
                assert_eq!(code, "GU");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skips_unknown_state_under_skip_policy() {
        let csv_data = "ID,AGENCY,STATE,DATE\n1,Guam PD,GU,2019-01-01\n2,DC PD,DC,2019-01-01\n3,Austin,TX,2019-01-01\n";
        let dataset =
            read_incidents(&incident_schema("skip"), csv_data.as_bytes(), &null_progress()).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.summary.skipped_unknown_state, 2);
    }

    #[test]
    fn non_numeric_incident_id_is_malformed() {
        let csv_data = "ID,AGENCY,STATE,DATE\nabc,Austin,TX,2019-01-01\n";
        let err = read_incidents(&incident_schema("reject"), csv_data.as_bytes(), &null_progress())
            .unwrap_err();
        assert!(
            matches!(err, SourceError::MalformedRecord { line: 2, .. }),
            "{err}"
        );
    }

    #[test]
    fn bad_date_is_malformed() {
        let csv_data = "ID,AGENCY,STATE,DATE\n1,Austin,TX,01/05/2019\n";
        let err = read_incidents(&incident_schema("reject"), csv_data.as_bytes(), &null_progress())
            .unwrap_err();
        assert!(matches!(err, SourceError::MalformedRecord { .. }), "{err}");
    }

    #[test]
    fn short_row_is_malformed() {
        let csv_data = "ID,AGENCY,STATE,DATE\n1,Austin,TX\n";
        let err = read_incidents(&incident_schema("reject"), csv_data.as_bytes(), &null_progress())
            .unwrap_err();
        match err {
            SourceError::MalformedRecord { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("position 3"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_schema_kind_is_rejected() {
        let err = read_incidents(&case_schema("2"), INCIDENTS_CSV.as_bytes(), &null_progress())
            .unwrap_err();
        assert!(matches!(err, SourceError::Schema { .. }));
    }

    /// Builds a case file whose count sits at `position`, with filler
    /// columns in between, mimicking the two observed dataset revisions.
    fn drifted_case_csv(position: usize) -> String {
        let mut header = vec!["date".to_string(), "state".to_string()];
        for i in 2..position {
            header.push(format!("filler{i}"));
        }
        header.push("positiveIncrease".to_string());

        let row = |date: &str, state: &str, cases: &str| {
            let mut fields = vec![date.to_string(), state.to_string()];
            fields.extend((2..position).map(|_| "9999".to_string()));
            fields.push(cases.to_string());
            fields.join(",")
        };

        [
            header.join(","),
            row("2020-03-01", "AL", "5"),
            row("2020-03-02", "AL", ""),
            row("2020-03-03", "PR", "40"),
            row("2021-01-01", "AL", "7"),
            row("2020-04-01", "AL", "-2"),
        ]
        .join("\n")
    }

    #[test]
    fn reads_both_column_revisions() {
        for position in [19, 21] {
            let schema = case_schema(&position.to_string());
            let data = drifted_case_csv(position);
            let dataset = read_cases(&schema, data.as_bytes(), &null_progress()).unwrap();

            let counts: Vec<u64> = dataset.records.iter().map(CaseRecord::case_count).collect();
            assert_eq!(counts, vec![5, 0, 0], "revision with cases at {position}");
            assert_eq!(dataset.summary.skipped_unknown_state, 1);
            assert_eq!(dataset.summary.skipped_out_of_window, 1);
            assert_eq!(dataset.summary.clamped_counts, 1);
        }
    }

    #[test]
    fn header_named_column_tolerates_drift() {
        let schema = case_schema("\"positiveIncrease\"");
        for position in [19, 21] {
            let data = drifted_case_csv(position);
            let dataset = read_cases(&schema, data.as_bytes(), &null_progress()).unwrap();
            assert_eq!(dataset.records[0].case_count(), 5);
        }
    }

    #[test]
    fn wrong_offset_fails_clearly() {
        let schema = case_schema("21");
        let data = drifted_case_csv(19);
        let err = read_cases(&schema, data.as_bytes(), &null_progress()).unwrap_err();
        assert!(matches!(err, SourceError::MalformedRecord { line: 2, .. }), "{err}");
    }

    #[test]
    fn non_numeric_case_count_is_malformed() {
        let schema = case_schema("2");
        let data = "date,state,cases\n2020-05-01,TX,lots\n";
        let err = read_cases(&schema, data.as_bytes(), &null_progress()).unwrap_err();
        assert!(matches!(err, SourceError::MalformedRecord { .. }), "{err}");
    }

    #[test]
    fn missing_file_reports_path() {
        let schema = incident_schema("reject");
        let err = read_incidents_from_path(
            &schema,
            Path::new("/nonexistent/hate_crime.csv"),
            &null_progress(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hate_crime.csv"), "{err}");
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hate-crime incident and COVID-19 case record types.
//!
//! Records are created once by the readers in `hate_trend_source` and are
//! never mutated afterwards: fields are private and only exposed through
//! getters. Constructors enforce the coverage window of each dataset.

use chrono::{Datelike as _, NaiveDate};
use hate_trend_state_models::UsState;
use serde::Serialize;

/// First year covered by the hate-crime incident dataset.
pub const EARLIEST_INCIDENT_YEAR: i32 = 1999;

/// The only year covered by the COVID-19 case dataset.
pub const REPORTING_YEAR: i32 = 2020;

/// One recorded hate-crime incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    id: u64,
    state: UsState,
    occurred_on: NaiveDate,
}

impl Incident {
    /// Creates an incident.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::BeforeCoverage`] if `occurred_on` falls
    /// before [`EARLIEST_INCIDENT_YEAR`].
    pub fn new(id: u64, state: UsState, occurred_on: NaiveDate) -> Result<Self, RecordError> {
        if occurred_on.year() < EARLIEST_INCIDENT_YEAR {
            return Err(RecordError::BeforeCoverage { date: occurred_on });
        }
        Ok(Self {
            id,
            state,
            occurred_on,
        })
    }

    /// Incident identifier from the source file.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// State the incident was reported in.
    #[must_use]
    pub const fn state(&self) -> UsState {
        self.state
    }

    /// Date the incident occurred.
    #[must_use]
    pub const fn occurred_on(&self) -> NaiveDate {
        self.occurred_on
    }

    /// Calendar year the incident occurred in.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.occurred_on.year()
    }

    /// Calendar month (1-12) the incident occurred in.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.occurred_on.month()
    }
}

/// One day's COVID-19 case count for a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    reported_on: NaiveDate,
    state: UsState,
    case_count: u64,
}

impl CaseRecord {
    /// Creates a case record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::OutsideReportingYear`] if `reported_on` is
    /// not within [`REPORTING_YEAR`].
    pub fn new(reported_on: NaiveDate, state: UsState, case_count: u64) -> Result<Self, RecordError> {
        if reported_on.year() != REPORTING_YEAR {
            return Err(RecordError::OutsideReportingYear { date: reported_on });
        }
        Ok(Self {
            reported_on,
            state,
            case_count,
        })
    }

    /// Date the cases were reported.
    #[must_use]
    pub const fn reported_on(&self) -> NaiveDate {
        self.reported_on
    }

    /// State the cases were reported in.
    #[must_use]
    pub const fn state(&self) -> UsState {
        self.state
    }

    /// Number of new positive cases reported that day.
    #[must_use]
    pub const fn case_count(&self) -> u64 {
        self.case_count
    }

    /// Calendar month (1-12) of the report.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.reported_on.month()
    }
}

/// Lookup key used when counting incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKey {
    /// All incidents in a state during a year.
    Year {
        /// State to match.
        state: UsState,
        /// Calendar year to match.
        year: i32,
    },
    /// All incidents in a state during one month of a year.
    Month {
        /// State to match.
        state: UsState,
        /// Calendar year to match.
        year: i32,
        /// Calendar month (1-12) to match.
        month: u32,
    },
}

impl AggregationKey {
    /// Returns `true` if the incident falls under this key.
    #[must_use]
    pub fn matches(&self, incident: &Incident) -> bool {
        match *self {
            Self::Year { state, year } => incident.state() == state && incident.year() == year,
            Self::Month { state, year, month } => {
                incident.state() == state && incident.year() == year && incident.month() == month
            }
        }
    }
}

/// Error returned when a record falls outside its dataset's coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// The incident predates [`EARLIEST_INCIDENT_YEAR`].
    BeforeCoverage {
        /// The offending date.
        date: NaiveDate,
    },
    /// The case report is not dated within [`REPORTING_YEAR`].
    OutsideReportingYear {
        /// The offending date.
        date: NaiveDate,
    },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeCoverage { date } => write!(
                f,
                "incident dated {date} predates coverage starting {EARLIEST_INCIDENT_YEAR}"
            ),
            Self::OutsideReportingYear { date } => {
                write!(f, "case report dated {date} is outside {REPORTING_YEAR}")
            }
        }
    }
}

impl std::error::Error for RecordError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn incident_accepts_coverage_start() {
        let incident = Incident::new(7, UsState::Alabama, date(1999, 1, 1)).unwrap();
        assert_eq!(incident.id(), 7);
        assert_eq!(incident.year(), 1999);
        assert_eq!(incident.month(), 1);
    }

    #[test]
    fn incident_rejects_dates_before_coverage() {
        let err = Incident::new(1, UsState::Alabama, date(1998, 12, 31)).unwrap_err();
        assert_eq!(
            err,
            RecordError::BeforeCoverage {
                date: date(1998, 12, 31)
            }
        );
    }

    #[test]
    fn case_record_must_be_in_reporting_year() {
        assert!(CaseRecord::new(date(2020, 3, 1), UsState::Texas, 12).is_ok());
        assert!(CaseRecord::new(date(2021, 1, 1), UsState::Texas, 12).is_err());
        assert!(CaseRecord::new(date(2019, 12, 31), UsState::Texas, 12).is_err());
    }

    #[test]
    fn year_key_matches_state_and_year_only() {
        let incident = Incident::new(1, UsState::Maryland, date(2020, 6, 15)).unwrap();
        let key = AggregationKey::Year {
            state: UsState::Maryland,
            year: 2020,
        };
        assert!(key.matches(&incident));

        let other_state = AggregationKey::Year {
            state: UsState::Maine,
            year: 2020,
        };
        assert!(!other_state.matches(&incident));
    }

    #[test]
    fn month_key_matches_month() {
        let incident = Incident::new(1, UsState::Maryland, date(2020, 6, 15)).unwrap();
        let june = AggregationKey::Month {
            state: UsState::Maryland,
            year: 2020,
            month: 6,
        };
        let july = AggregationKey::Month {
            state: UsState::Maryland,
            year: 2020,
            month: 7,
        };
        assert!(june.matches(&incident));
        assert!(!july.matches(&incident));
    }
}

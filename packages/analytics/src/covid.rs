//! Monthly COVID-19 case totals and their pairing with incident counts.

use hate_trend_analytics_models::{CovidIncidentPoint, MonthlyCases};
use hate_trend_incident_models::{CaseRecord, Incident, REPORTING_YEAR};
use hate_trend_state_models::UsState;

use crate::aggregate::count_by_month;

/// Sums daily case counts for `state` by month of the reporting year.
///
/// Always returns twelve entries, January first, with zero for months that
/// have no rows.
#[must_use]
pub fn monthly_case_totals(cases: &[CaseRecord], state: UsState) -> Vec<MonthlyCases> {
    let mut totals = [0_u64; 12];
    for record in cases.iter().filter(|r| r.state() == state) {
        let slot = &mut totals[(record.month() - 1) as usize];
        *slot = slot.saturating_add(record.case_count());
    }

    (1..=12)
        .zip(totals)
        .map(|(month, cases)| MonthlyCases {
            state,
            month,
            cases,
        })
        .collect()
}

/// Pairs each month's case total with that month's incident count for
/// `state` during the reporting year.
#[must_use]
pub fn covid_incident_series(
    cases: &[CaseRecord],
    incidents: &[Incident],
    state: UsState,
) -> Vec<CovidIncidentPoint> {
    monthly_case_totals(cases, state)
        .into_iter()
        .map(|monthly| CovidIncidentPoint {
            month: monthly.month,
            cases: monthly.cases,
            incidents: count_by_month(incidents, state, REPORTING_YEAR, monthly.month),
        })
        .collect()
}

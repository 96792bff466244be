//! Incident counting by state and period.
//!
//! Every count is a full linear scan over the record slice. Nothing is
//! cached, so results never depend on call order or record order.

use hate_trend_analytics_models::TimeSeriesPoint;
use hate_trend_incident_models::{AggregationKey, Incident};
use hate_trend_state_models::UsState;

/// Number of incidents matching `key`.
#[must_use]
pub fn count_matching(records: &[Incident], key: &AggregationKey) -> u64 {
    records.iter().filter(|incident| key.matches(incident)).count() as u64
}

/// Number of incidents in `state` during `year`. Zero if none match.
#[must_use]
pub fn count_by_year(records: &[Incident], state: UsState, year: i32) -> u64 {
    count_matching(records, &AggregationKey::Year { state, year })
}

/// Number of incidents in `state` during `month` (1-12) of `year`. Zero if
/// none match, including for months outside 1-12.
#[must_use]
pub fn count_by_month(records: &[Incident], state: UsState, year: i32, month: u32) -> u64 {
    count_matching(records, &AggregationKey::Month { state, year, month })
}

/// Yearly counts for `state`, one point per year labeled `"YYYY"`.
#[must_use]
pub fn yearly_series(
    records: &[Incident],
    state: UsState,
    years: std::ops::RangeInclusive<i32>,
) -> Vec<TimeSeriesPoint> {
    years
        .map(|year| TimeSeriesPoint {
            period: year.to_string(),
            count: count_by_year(records, state, year),
        })
        .collect()
}

/// Monthly counts for `state`, twelve points per year labeled
/// `"YYYY, M"`.
#[must_use]
pub fn monthly_series(
    records: &[Incident],
    state: UsState,
    years: std::ops::RangeInclusive<i32>,
) -> Vec<TimeSeriesPoint> {
    years
        .flat_map(|year| (1..=12).map(move |month| (year, month)))
        .map(|(year, month)| TimeSeriesPoint {
            period: format!("{year}, {month}"),
            count: count_by_month(records, state, year, month),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn incident(id: u64, state: UsState, y: i32, m: u32, d: u32) -> Incident {
        Incident::new(id, state, NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap()
    }

    fn sample() -> Vec<Incident> {
        vec![
            incident(1, UsState::Alabama, 2019, 1, 15),
            incident(2, UsState::Alabama, 2019, 1, 20),
            incident(3, UsState::Alabama, 2019, 7, 4),
            incident(4, UsState::Alabama, 2020, 3, 1),
            incident(5, UsState::Georgia, 2019, 1, 15),
            incident(6, UsState::Alabama, 2019, 12, 31),
        ]
    }

    #[test]
    fn counts_by_year() {
        let records = sample();
        assert_eq!(count_by_year(&records, UsState::Alabama, 2019), 4);
        assert_eq!(count_by_year(&records, UsState::Alabama, 2020), 1);
        assert_eq!(count_by_year(&records, UsState::Georgia, 2019), 1);
    }

    #[test]
    fn empty_year_is_zero() {
        let records = sample();
        assert_eq!(count_by_year(&records, UsState::Alabama, 2005), 0);
        assert_eq!(count_by_year(&[], UsState::Alabama, 2019), 0);
    }

    #[test]
    fn counts_by_month() {
        let records = sample();
        assert_eq!(count_by_month(&records, UsState::Alabama, 2019, 1), 2);
        assert_eq!(count_by_month(&records, UsState::Alabama, 2019, 2), 0);
        assert_eq!(count_by_month(&records, UsState::Alabama, 2019, 13), 0);
    }

    #[test]
    fn year_equals_sum_of_months() {
        let records = sample();
        for state in UsState::all() {
            for year in 2018..=2021 {
                let months: u64 = (1..=12)
                    .map(|month| count_by_month(&records, state, year, month))
                    .sum();
                assert_eq!(count_by_year(&records, state, year), months, "{state} {year}");
            }
        }
    }

    #[test]
    fn order_independent() {
        let records = sample();
        let mut reversed = records.clone();
        reversed.reverse();
        for state in [UsState::Alabama, UsState::Georgia] {
            assert_eq!(
                yearly_series(&records, state, 2018..=2020),
                yearly_series(&reversed, state, 2018..=2020)
            );
            assert_eq!(
                monthly_series(&records, state, 2019..=2020),
                monthly_series(&reversed, state, 2019..=2020)
            );
        }
    }

    #[test]
    fn yearly_series_labels() {
        let series = yearly_series(&sample(), UsState::Alabama, 2019..=2020);
        assert_eq!(
            series,
            vec![
                TimeSeriesPoint {
                    period: "2019".to_string(),
                    count: 4
                },
                TimeSeriesPoint {
                    period: "2020".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn monthly_series_covers_every_month() {
        let series = monthly_series(&sample(), UsState::Alabama, 1999..=2020);
        assert_eq!(series.len(), 22 * 12);
        assert_eq!(series[0].period, "1999, 1");
        let july_2019 = series.iter().find(|p| p.period == "2019, 7").unwrap();
        assert_eq!(july_2019.count, 1);
    }
}

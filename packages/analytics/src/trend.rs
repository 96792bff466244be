//! Yearly slope estimation by bisection toward the end of a window.
//!
//! The estimator starts from the slope across the whole window, then
//! repeatedly moves the lower bound halfway toward the end year and
//! re-measures the slope from there, stopping once two successive
//! estimates differ by at most one. All division is truncating integer
//! division.
//!
//! A zero-length span is reported as [`TrendError::ZeroSpan`] rather than
//! dividing by zero, and refinement is capped at a caller-supplied number
//! of iterations.

use hate_trend_analytics_models::TrendEstimate;
use hate_trend_incident_models::Incident;
use hate_trend_state_models::UsState;
use thiserror::Error;

use crate::aggregate::count_by_year;

/// Largest difference between successive slopes that counts as stable.
const CONVERGENCE_TOLERANCE: i64 = 1;

/// Errors produced by [`estimate_slope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrendError {
    /// The window starts after it ends.
    #[error("invalid year range {start}..={end}: start is after end")]
    InvalidRange {
        /// First year of the window.
        start: i32,
        /// Last year of the window.
        end: i32,
    },

    /// A slope was requested over a span of zero years.
    #[error("zero-length span at {year}: slope denominator is zero")]
    ZeroSpan {
        /// The year both ends of the span fell on.
        year: i32,
    },

    /// Successive estimates were still moving when the cap was reached.
    #[error("slope did not converge within {iterations} iterations (last slope {last_slope})")]
    NotConverged {
        /// Iterations performed.
        iterations: u32,
        /// Most recent slope estimate.
        last_slope: i64,
    },
}

/// Estimates the yearly change in `state`'s incident count over
/// `start..=end`.
///
/// # Errors
///
/// * [`TrendError::InvalidRange`] if `start > end`.
/// * [`TrendError::ZeroSpan`] if `start == end`.
/// * [`TrendError::NotConverged`] if the estimate has not stabilized
///   after `max_iterations` refinement steps.
pub fn estimate_slope(
    records: &[Incident],
    state: UsState,
    start: i32,
    end: i32,
    max_iterations: u32,
) -> Result<TrendEstimate, TrendError> {
    if start > end {
        return Err(TrendError::InvalidRange { start, end });
    }

    let count = |year| saturating_i64(count_by_year(records, state, year));
    let end_count = count(end);

    let initial_slope = slope_between(start, count(start), end, end_count)?;
    let mut previous = initial_slope;
    let mut lower = start;

    for iteration in 1..=max_iterations {
        let midpoint = midpoint(lower, end);
        let slope = slope_between(midpoint, count(midpoint), end, end_count)?;

        log::trace!(
            "{state}: iteration {iteration} midpoint {midpoint} slope {slope} (previous {previous})"
        );

        if (slope - previous).abs() <= CONVERGENCE_TOLERANCE {
            return Ok(TrendEstimate {
                initial_slope,
                slope,
                iterations: iteration,
                midpoint,
            });
        }

        previous = slope;
        lower = midpoint;
    }

    Err(TrendError::NotConverged {
        iterations: max_iterations,
        last_slope: previous,
    })
}

/// `lower + (end - lower) / 2`, computed without overflowing `i32`.
fn midpoint(lower: i32, end: i32) -> i32 {
    let mid = i64::from(lower) + (i64::from(end) - i64::from(lower)) / 2;
    // Lies in [lower, end], so it always fits.
    i32::try_from(mid).unwrap_or(end)
}

fn slope_between(from: i32, from_count: i64, to: i32, to_count: i64) -> Result<i64, TrendError> {
    let span = i64::from(to) - i64::from(from);
    if span == 0 {
        return Err(TrendError::ZeroSpan { year: from });
    }
    Ok((to_count - from_count) / span)
}

fn saturating_i64(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    /// `count` incidents in `state` on January 1st of `year`.
    fn incidents(state: UsState, year: i32, count: u64) -> Vec<Incident> {
        let date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        (0..count)
            .map(|id| Incident::new(id, state, date).unwrap())
            .collect()
    }

    fn endpoints_10_and_50() -> Vec<Incident> {
        let mut records = incidents(UsState::Alabama, 1999, 10);
        records.extend(incidents(UsState::Alabama, 2019, 50));
        records
    }

    #[test]
    fn sparse_history_converges_within_cap() {
        let records = endpoints_10_and_50();
        let estimate = estimate_slope(&records, UsState::Alabama, 1999, 2019, 64).unwrap();

        // Midpoints 2009, 2014, 2016, 2017, 2018, 2018 give slopes
        // 5, 10, 16, 25, 50, 50.
        assert_eq!(
            estimate,
            TrendEstimate {
                initial_slope: 2,
                slope: 50,
                iterations: 6,
                midpoint: 2018,
            }
        );
    }

    #[test]
    fn linear_history_converges_immediately() {
        let mut records = Vec::new();
        for year in 1999..=2019 {
            let count = 10 + 2 * u64::try_from(year - 1999).unwrap();
            records.extend(incidents(UsState::Texas, year, count));
        }

        let estimate = estimate_slope(&records, UsState::Texas, 1999, 2019, 64).unwrap();
        assert_eq!(estimate.initial_slope, 2);
        assert_eq!(estimate.slope, 2);
        assert_eq!(estimate.iterations, 1);
        assert_eq!(estimate.midpoint, 2009);
    }

    #[test]
    fn initial_slope_truncates_toward_zero() {
        let records = incidents(UsState::Ohio, 2017, 7);
        let estimate = estimate_slope(&records, UsState::Ohio, 2017, 2019, 64).unwrap();
        assert_eq!(estimate.initial_slope, -3);
        assert_eq!(estimate.slope, 0);
    }

    #[test]
    fn ignores_other_states() {
        let mut records = endpoints_10_and_50();
        records.extend(incidents(UsState::Georgia, 2009, 1_000));
        let estimate = estimate_slope(&records, UsState::Alabama, 1999, 2019, 64).unwrap();
        assert_eq!(estimate.slope, 50);
    }

    #[test]
    fn zero_span_is_an_error() {
        let records = endpoints_10_and_50();
        assert_eq!(
            estimate_slope(&records, UsState::Alabama, 2019, 2019, 64),
            Err(TrendError::ZeroSpan { year: 2019 })
        );
    }

    #[test]
    fn reversed_range_is_an_error() {
        assert_eq!(
            estimate_slope(&[], UsState::Alabama, 2019, 1999, 64),
            Err(TrendError::InvalidRange {
                start: 2019,
                end: 1999
            })
        );
    }

    #[test]
    fn iteration_cap_surfaces_non_convergence() {
        let records = endpoints_10_and_50();
        assert_eq!(
            estimate_slope(&records, UsState::Alabama, 1999, 2019, 2),
            Err(TrendError::NotConverged {
                iterations: 2,
                last_slope: 10
            })
        );
        assert_eq!(
            estimate_slope(&records, UsState::Alabama, 1999, 2019, 0),
            Err(TrendError::NotConverged {
                iterations: 0,
                last_slope: 2
            })
        );
    }

    #[test]
    fn one_year_window_converges() {
        let mut records = incidents(UsState::Alabama, 2018, 12);
        records.extend(incidents(UsState::Alabama, 2019, 20));
        let estimate = estimate_slope(&records, UsState::Alabama, 2018, 2019, 64).unwrap();
        assert_eq!(estimate.slope, 8);
        assert_eq!(estimate.iterations, 1);
    }

    #[test]
    fn midpoint_truncates_toward_lower() {
        assert_eq!(midpoint(1999, 2019), 2009);
        assert_eq!(midpoint(2014, 2019), 2016);
        assert_eq!(midpoint(2018, 2019), 2018);
    }

    #[test]
    fn extreme_years_do_not_overflow() {
        assert_eq!(midpoint(i32::MIN, i32::MAX), -1);

        let estimate = estimate_slope(&[], UsState::Alabama, i32::MIN, i32::MAX - 1, 64).unwrap();
        assert_eq!(estimate.slope, 0);
        assert_eq!(estimate.midpoint, -1);
    }
}

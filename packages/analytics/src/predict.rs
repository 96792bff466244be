//! Per-state projection of incident counts for the target year.

use std::collections::BTreeMap;

use hate_trend_analytics_models::{AnalysisConfig, FloorPolicy, PredictionFormula};
use hate_trend_incident_models::Incident;
use hate_trend_state_models::UsState;

use crate::AnalyticsError;
use crate::aggregate::count_by_year;
use crate::config::validate;
use crate::trend::estimate_slope;

/// Projects a count `steps` years past a base count using `slope`, then
/// applies the floor policy. Arithmetic saturates instead of overflowing.
#[must_use]
pub const fn project(
    formula: PredictionFormula,
    floor: FloorPolicy,
    base: i64,
    slope: i64,
    steps: i64,
) -> i64 {
    let projected = match formula {
        PredictionFormula::Additive => base.saturating_add(slope.saturating_mul(steps)),
        PredictionFormula::Proportional => {
            base.saturating_add(slope.saturating_mul(base).saturating_mul(steps))
        }
    };
    floor.apply(projected)
}

/// Projects `state`'s incident count for `config.target_year`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Trend`] if the slope estimator fails.
pub fn predict_state(
    records: &[Incident],
    state: UsState,
    config: &AnalysisConfig,
) -> Result<i64, AnalyticsError> {
    let estimate = estimate_slope(
        records,
        state,
        config.history_start,
        config.history_end,
        config.max_iterations,
    )
    .map_err(|source| AnalyticsError::Trend { state, source })?;

    let base = i64::try_from(count_by_year(records, state, config.history_end)).unwrap_or(i64::MAX);
    let steps = i64::from(config.target_year) - i64::from(config.history_end);
    let predicted = project(config.formula, config.floor, base, estimate.slope, steps);

    log::debug!(
        "{state}: base {base} ({}), slope {} after {} iterations, predicted {predicted} for {}",
        config.history_end,
        estimate.slope,
        estimate.iterations,
        config.target_year
    );

    Ok(predicted)
}

/// Projects the target-year incident count for each of the 50 states.
///
/// # Errors
///
/// Returns [`AnalyticsError::Config`] if the config is invalid, or
/// [`AnalyticsError::Trend`] for the first state whose estimate fails.
pub fn predict_counts(
    records: &[Incident],
    config: &AnalysisConfig,
) -> Result<BTreeMap<UsState, i64>, AnalyticsError> {
    validate(config)?;

    log::info!(
        "Predicting {} from {}..={} ({} formula, floor {:?})",
        config.target_year,
        config.history_start,
        config.history_end,
        config.formula,
        config.floor
    );

    UsState::all()
        .into_iter()
        .map(|state| Ok((state, predict_state(records, state, config)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::TrendError;

    fn incidents(state: UsState, year: i32, count: u64) -> Vec<Incident> {
        let date = NaiveDate::from_ymd_opt(year, 6, 1).unwrap();
        (0..count)
            .map(|id| Incident::new(id, state, date).unwrap())
            .collect()
    }

    #[test]
    fn additive_and_proportional_formulas() {
        let none = FloorPolicy::None;
        assert_eq!(project(PredictionFormula::Additive, none, 12, 1, 1), 13);
        assert_eq!(project(PredictionFormula::Proportional, none, 12, 1, 1), 24);
        assert_eq!(project(PredictionFormula::Additive, none, 12, 3, 2), 18);
        assert_eq!(project(PredictionFormula::Proportional, none, 10, -2, 1), -10);
    }

    #[test]
    fn floor_is_applied_after_projection() {
        let clamp = FloorPolicy::Clamp { min: 1 };
        assert_eq!(project(PredictionFormula::Additive, clamp, 2, -5, 1), 1);
        assert_eq!(project(PredictionFormula::Additive, FloorPolicy::None, 2, -5, 1), -3);
    }

    #[test]
    fn projection_saturates() {
        assert_eq!(
            project(PredictionFormula::Proportional, FloorPolicy::None, i64::MAX, 2, 1),
            i64::MAX
        );
    }

    #[test]
    fn predicts_every_state() {
        let mut records = incidents(UsState::Alabama, 2019, 12);
        records.extend(incidents(UsState::Alabama, 2020, 20));

        let predictions = predict_counts(&records, &AnalysisConfig::default()).unwrap();
        assert_eq!(predictions.len(), 50);
        // 1999: 0, 2019: 12 -> initial slope 0; midpoint 2009 -> slope 1.
        assert_eq!(predictions[&UsState::Alabama], 13);
        assert_eq!(predictions[&UsState::Wyoming], 0);
    }

    #[test]
    fn proportional_config_changes_prediction() {
        let records = incidents(UsState::Alabama, 2019, 12);
        let config = AnalysisConfig {
            formula: PredictionFormula::Proportional,
            ..AnalysisConfig::default()
        };
        assert_eq!(predict_state(&records, UsState::Alabama, &config).unwrap(), 24);
    }

    #[test]
    fn zero_span_window_surfaces_state() {
        let config = AnalysisConfig {
            history_start: 2019,
            history_end: 2019,
            ..AnalysisConfig::default()
        };
        let err = predict_counts(&[], &config).unwrap_err();
        match err {
            AnalyticsError::Trend { state, source } => {
                assert_eq!(state, UsState::Alabama);
                assert_eq!(source, TrendError::ZeroSpan { year: 2019 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_estimating() {
        let config = AnalysisConfig {
            target_year: 2010,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            predict_counts(&[], &config),
            Err(AnalyticsError::Config { .. })
        ));
    }
}

//! Percent deviation of actual counts from predicted counts.

use std::collections::BTreeMap;

use hate_trend_analytics_models::{AnalysisConfig, PredictionResult};
use hate_trend_incident_models::Incident;
use hate_trend_state_models::UsState;

use crate::AnalyticsError;
use crate::aggregate::count_by_year;
use crate::predict::predict_counts;

/// `(actual - predicted) / predicted * 100`.
///
/// Undefined when `predicted` is zero, in which case this returns
/// [`f64::NAN`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent_difference(actual: u64, predicted: i64) -> f64 {
    if predicted == 0 {
        return f64::NAN;
    }
    let predicted = predicted as f64;
    (actual as f64 - predicted) / predicted * 100.0
}

/// Actual incident counts for `year`, for all 50 states.
#[must_use]
pub fn actual_counts(records: &[Incident], year: i32) -> BTreeMap<UsState, u64> {
    UsState::all()
        .into_iter()
        .map(|state| (state, count_by_year(records, state, year)))
        .collect()
}

/// Pairs each prediction with its actual count. Results follow the
/// `predictions` map, so they come out in [`UsState`] order (alphabetical by
/// full name, the same order as [`UsState::all`]). A state with no actual
/// count is treated as zero.
#[must_use]
pub fn compare(
    actuals: &BTreeMap<UsState, u64>,
    predictions: &BTreeMap<UsState, i64>,
) -> Vec<PredictionResult> {
    predictions
        .iter()
        .map(|(&state, &predicted_count)| {
            let actual_count = actuals.get(&state).copied().unwrap_or(0);
            PredictionResult {
                state,
                percent_difference: percent_difference(actual_count, predicted_count),
                actual_count,
                predicted_count,
            }
        })
        .collect()
}

/// Predicts every state's count for `config.target_year` and compares it
/// against what was actually recorded that year.
///
/// # Errors
///
/// Propagates any [`AnalyticsError`] from [`predict_counts`].
pub fn calculate_percent_difference(
    records: &[Incident],
    config: &AnalysisConfig,
) -> Result<Vec<PredictionResult>, AnalyticsError> {
    let predictions = predict_counts(records, config)?;
    let actuals = actual_counts(records, config.target_year);
    let results = compare(&actuals, &predictions);

    let undefined = results
        .iter()
        .filter(|r| r.percent_difference.is_nan())
        .count();
    if undefined > 0 {
        log::warn!("{undefined} state(s) have a predicted count of zero; percent difference is undefined");
    }
    log::info!("Compared {} states for {}", results.len(), config.target_year);

    Ok(results)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Configuration and result types for hate-crime trend analysis.
//!
//! Defines the knobs of the prediction pipeline ([`AnalysisConfig`]) and
//! the typed values it produces: slope estimates, per-state comparisons,
//! and the series used for figures.

use hate_trend_state_models::UsState;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How a slope and a base-year count combine into a projection.
///
/// Two formulas have been used for this analysis and neither is
/// authoritative, so the choice is always explicit.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PredictionFormula {
    /// `base + slope * steps`: the slope is an absolute yearly change.
    #[default]
    Additive,
    /// `base + slope * base * steps`: the slope scales the base count.
    Proportional,
}

/// Lower bound applied to projected counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FloorPolicy {
    /// Projections may be zero or negative.
    #[default]
    None,
    /// Projections below `min` are raised to `min`.
    Clamp {
        /// Smallest allowed projection.
        min: i64,
    },
}

impl FloorPolicy {
    /// Applies the policy to a raw projection.
    #[must_use]
    pub const fn apply(self, projected: i64) -> i64 {
        match self {
            Self::None => projected,
            Self::Clamp { min } => {
                if projected < min {
                    min
                } else {
                    projected
                }
            }
        }
    }
}

/// Parameters for the prediction pipeline.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First year of the historical window used for the slope.
    pub history_start: i32,
    /// Last year of the historical window; also the base year of the
    /// projection.
    pub history_end: i32,
    /// Year being predicted and compared against actual counts.
    pub target_year: i32,
    /// Projection formula.
    pub formula: PredictionFormula,
    /// Lower bound for projections.
    pub floor: FloorPolicy,
    /// Maximum refinement steps of the slope estimator.
    pub max_iterations: u32,
    /// First year shown in time-series figures.
    pub series_start: i32,
    /// Last year shown in time-series figures.
    pub series_end: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_start: 1999,
            history_end: 2019,
            target_year: 2020,
            formula: PredictionFormula::default(),
            floor: FloorPolicy::default(),
            max_iterations: 64,
            series_start: 1999,
            series_end: 2020,
        }
    }
}

/// Outcome of a converged slope estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendEstimate {
    /// Slope across the whole window, before refinement.
    pub initial_slope: i64,
    /// Estimated yearly change in incident count.
    pub slope: i64,
    /// Refinement steps taken before the estimate stabilized.
    pub iterations: u32,
    /// Year the final slope was measured from.
    pub midpoint: i32,
}

/// Predicted versus actual incident counts for one state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// The state.
    pub state: UsState,
    /// `(actual - predicted) / predicted * 100`; NaN when `predicted` is 0.
    pub percent_difference: f64,
    /// Observed incident count for the target year.
    pub actual_count: u64,
    /// Projected incident count for the target year.
    pub predicted_count: i64,
}

/// A labeled count in a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Period label (e.g. `"2019"` or `"2019, 3"`).
    pub period: String,
    /// Incident count in this period.
    pub count: u64,
}

/// Total COVID-19 cases reported in a state during one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCases {
    /// The state.
    pub state: UsState,
    /// Calendar month (1-12).
    pub month: u32,
    /// Sum of the daily counts in the month.
    pub cases: u64,
}

/// COVID-19 cases and hate-crime incidents for the same state and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CovidIncidentPoint {
    /// Calendar month (1-12).
    pub month: u32,
    /// Total cases reported in the month.
    pub cases: u64,
    /// Hate-crime incidents that occurred in the month.
    pub incidents: u64,
}

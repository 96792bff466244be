#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident aggregation, trend estimation, and prediction comparison.
//!
//! The pipeline is a single synchronous pass over in-memory records:
//! [`aggregate`] counts incidents per state and period, [`trend`] turns a
//! historical window into a yearly slope, [`predict`] projects each state's
//! count for the target year, and [`compare`] measures how far the actual
//! count landed from the projection.

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod covid;
pub mod predict;
pub mod trend;

use hate_trend_state_models::UsState;
use thiserror::Error;

pub use trend::TrendError;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The slope estimator failed for a state.
    #[error("Trend estimation failed for {state}: {source}")]
    Trend {
        /// State being estimated.
        state: UsState,
        /// Underlying estimator error.
        #[source]
        source: TrendError,
    },

    /// The analysis configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

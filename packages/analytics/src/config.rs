//! Loading and validating [`AnalysisConfig`].

use std::path::Path;

use hate_trend_analytics_models::AnalysisConfig;
use hate_trend_incident_models::EARLIEST_INCIDENT_YEAR;

use crate::AnalyticsError;

/// Latest year any config field may name.
pub const LATEST_YEAR: i32 = 9999;

/// Parses an analysis config from TOML. Missing keys take their defaults.
///
/// # Errors
///
/// Returns [`AnalyticsError::Config`] if the TOML is malformed or the
/// resulting config fails [`validate`].
pub fn parse_config_toml(toml_str: &str) -> Result<AnalysisConfig, AnalyticsError> {
    let config: AnalysisConfig = toml::from_str(toml_str).map_err(|e| AnalyticsError::Config {
        message: e.to_string(),
    })?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses an analysis config file.
///
/// # Errors
///
/// Returns [`AnalyticsError::Config`] if the file cannot be read or is not
/// a valid config.
pub fn load_config_file(path: &Path) -> Result<AnalysisConfig, AnalyticsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| AnalyticsError::Config {
        message: format!("Failed to read {}: {e}", path.display()),
    })?;
    parse_config_toml(&contents)
}

/// Checks the year bounds and ordering the pipeline relies on.
///
/// Every year must fall within [`EARLIEST_INCIDENT_YEAR`]..=[`LATEST_YEAR`].
/// A window with `history_start == history_end` is allowed here; the
/// estimator reports it as a zero-length span.
///
/// # Errors
///
/// Returns [`AnalyticsError::Config`] describing the first violation.
pub fn validate(config: &AnalysisConfig) -> Result<(), AnalyticsError> {
    let years = [
        ("history_start", config.history_start),
        ("history_end", config.history_end),
        ("target_year", config.target_year),
        ("series_start", config.series_start),
        ("series_end", config.series_end),
    ];
    for (field, year) in years {
        if !(EARLIEST_INCIDENT_YEAR..=LATEST_YEAR).contains(&year) {
            return Err(AnalyticsError::Config {
                message: format!(
                    "{field} ({year}) must be between {EARLIEST_INCIDENT_YEAR} and {LATEST_YEAR}"
                ),
            });
        }
    }

    if config.history_start > config.history_end {
        return Err(AnalyticsError::Config {
            message: format!(
                "history_start ({}) is after history_end ({})",
                config.history_start, config.history_end
            ),
        });
    }
    if config.target_year <= config.history_end {
        return Err(AnalyticsError::Config {
            message: format!(
                "target_year ({}) must be after history_end ({})",
                config.target_year, config.history_end
            ),
        });
    }
    if config.series_start > config.series_end {
        return Err(AnalyticsError::Config {
            message: format!(
                "series_start ({}) is after series_end ({})",
                config.series_start, config.series_end
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use hate_trend_analytics_models::{FloorPolicy, PredictionFormula};

    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(parse_config_toml("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn parses_formula_and_floor() {
        let config = parse_config_toml(
            r#"
            formula = "proportional"
            floor = { type = "clamp", min = 1 }
            max_iterations = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.formula, PredictionFormula::Proportional);
        assert_eq!(config.floor, FloorPolicy::Clamp { min: 1 });
        assert_eq!(config.max_iterations, 16);
        assert_eq!(config.history_end, 2019);
    }

    #[test]
    fn rejects_target_inside_history() {
        let err = parse_config_toml("target_year = 2019").unwrap_err();
        assert!(err.to_string().contains("target_year"), "{err}");
    }

    #[test]
    fn rejects_reversed_history() {
        assert!(parse_config_toml("history_start = 2020\nhistory_end = 2010\ntarget_year = 2021").is_err());
    }

    #[test]
    fn rejects_years_outside_coverage() {
        let err = parse_config_toml("history_start = 1990").unwrap_err();
        assert!(err.to_string().contains("history_start (1990)"), "{err}");

        let err = parse_config_toml("target_year = 10000").unwrap_err();
        assert!(err.to_string().contains("target_year"), "{err}");
    }

    #[test]
    fn rejects_extreme_window() {
        let err = parse_config_toml(
            "history_start = -2147483648\nhistory_end = 2147483646\ntarget_year = 2147483647",
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::Config { .. }));
    }

    #[test]
    fn rejects_unknown_formula() {
        assert!(parse_config_toml("formula = \"quadratic\"").is_err());
    }
}

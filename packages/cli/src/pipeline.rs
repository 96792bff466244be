//! The analysis steps behind each subcommand.
//!
//! Every step loads what it needs from the paths in [`PipelineArgs`],
//! reports progress through `indicatif` bars, and writes its outputs into
//! the output directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use hate_trend_analytics::aggregate::{monthly_series, yearly_series};
use hate_trend_analytics::compare::calculate_percent_difference;
use hate_trend_analytics::config::{load_config_file, validate};
use hate_trend_analytics::covid::covid_incident_series;
use hate_trend_analytics_models::{AnalysisConfig, FloorPolicy, PredictionFormula};
use hate_trend_cli_utils::{IndicatifProgress, MultiProgress};
use hate_trend_generate::charts::{
    choropleth_figure, covid_scatter_figure, month_series_figure, write_figure_html,
    year_series_figure,
};
use hate_trend_generate::export::{read_percent_diff_csv, write_percent_diff_csv};
use hate_trend_incident_models::{CaseRecord, Incident};
use hate_trend_source::reader::{read_cases_from_path, read_incidents_from_path};
use hate_trend_source::registry::{
    DEFAULT_CASE_SCHEMA, DEFAULT_INCIDENT_SCHEMA, all_schemas, resolve_schema,
};
use hate_trend_state_models::UsState;

/// File name of the exported percent-difference table.
pub const PERCENT_DIFF_FILE: &str = "percent_diff.csv";

/// File name of the choropleth page.
pub const MAP_FILE: &str = "map.html";

/// Input, configuration, and output locations shared by every step.
#[derive(Args, Clone, Debug)]
pub struct PipelineArgs {
    /// Hate-crime incident file
    #[arg(long, global = true, default_value = "hate_crime.csv")]
    pub incidents: PathBuf,

    /// COVID-19 daily case file
    #[arg(long, global = true, default_value = "all-states-history.csv")]
    pub cases: PathBuf,

    /// Schema id or path to a schema `.toml` for the incident file
    #[arg(long, global = true, default_value = DEFAULT_INCIDENT_SCHEMA)]
    pub incident_schema: String,

    /// Schema id or path to a schema `.toml` for the case file
    #[arg(long, global = true, default_value = DEFAULT_CASE_SCHEMA)]
    pub case_schema: String,

    /// Analysis config TOML (history window, target year, formula, floor)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the prediction formula (`additive` or `proportional`)
    #[arg(long, global = true, value_parser = parse_formula)]
    pub formula: Option<PredictionFormula>,

    /// Clamp predictions to at least this value
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub floor_min: Option<i64>,

    /// Directory to write tables and figures into
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,
}

/// Parses a state code for `clap`, accepting deprecated codes.
///
/// # Errors
///
/// Returns a message naming the code if it is not one of the 50 states.
pub fn parse_state(code: &str) -> Result<UsState, String> {
    UsState::from_code(code).map_err(|e| e.to_string())
}

/// Parses a prediction formula name for `clap`.
///
/// # Errors
///
/// Returns a message listing the accepted names.
pub fn parse_formula(name: &str) -> Result<PredictionFormula, String> {
    name.parse()
        .map_err(|_| format!("unknown formula '{name}' (expected 'additive' or 'proportional')"))
}

/// Parses a floor entered at a prompt. Blank means no floor.
///
/// # Errors
///
/// Returns a message if the input is neither blank nor a whole number.
pub fn parse_floor_min(input: &str) -> Result<Option<i64>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse()
        .map(Some)
        .map_err(|e| format!("'{input}' is not a whole number: {e}"))
}

/// Loads the analysis config and applies command-line overrides.
///
/// # Errors
///
/// Returns an error if the config file is invalid or the overrides leave
/// the config inconsistent.
pub fn analysis_config(args: &PipelineArgs) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(formula) = args.formula {
        config.formula = formula;
    }
    if let Some(min) = args.floor_min {
        config.floor = FloorPolicy::Clamp { min };
    }

    validate(&config)?;
    Ok(config)
}

fn load_incidents(
    multi: &MultiProgress,
    args: &PipelineArgs,
) -> Result<Vec<Incident>, Box<dyn std::error::Error>> {
    let schema = resolve_schema(&args.incident_schema)?;
    let progress = IndicatifProgress::records_bar(multi, "Incidents");
    let dataset = read_incidents_from_path(&schema, &args.incidents, &progress)?;
    Ok(dataset.records)
}

fn load_cases(
    multi: &MultiProgress,
    args: &PipelineArgs,
) -> Result<Vec<CaseRecord>, Box<dyn std::error::Error>> {
    let schema = resolve_schema(&args.case_schema)?;
    let progress = IndicatifProgress::records_bar(multi, "Cases");
    let dataset = read_cases_from_path(&schema, &args.cases, &progress)?;
    Ok(dataset.records)
}

/// Predicts, compares, exports the table, and draws the map.
///
/// # Errors
///
/// Returns an error if any step fails.
pub fn run(multi: &MultiProgress, args: &PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = analysis_config(args)?;
    let steps = IndicatifProgress::steps_bar(multi, "Pipeline", 4);

    steps.set_message("[1/4] Loading incidents".to_string());
    let incidents = load_incidents(multi, args)?;
    steps.inc(1);

    steps.set_message("[2/4] Predicting".to_string());
    let results = calculate_percent_difference(&incidents, &config)?;
    steps.inc(1);

    steps.set_message("[3/4] Exporting".to_string());
    let table_path = args.output_dir.join(PERCENT_DIFF_FILE);
    write_percent_diff_csv(&table_path, &results)?;
    steps.inc(1);

    steps.set_message("[4/4] Drawing map".to_string());
    let map_path = args.output_dir.join(MAP_FILE);
    write_figure_html(&map_path, &choropleth_figure(&results, config.target_year))?;
    steps.inc(1);

    steps.finish("Pipeline complete".to_string());
    log::info!(
        "Pipeline complete in {:.1}s: {} and {}",
        start.elapsed().as_secs_f64(),
        table_path.display(),
        map_path.display()
    );
    Ok(())
}

/// Writes the three per-state figures.
///
/// # Errors
///
/// Returns an error if either dataset fails to load or a figure cannot be
/// written.
pub fn graphs(
    multi: &MultiProgress,
    args: &PipelineArgs,
    state: UsState,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = analysis_config(args)?;
    let incidents = load_incidents(multi, args)?;
    let cases = load_cases(multi, args)?;
    let years = config.series_start..=config.series_end;
    let code = state.code();

    let figures = [
        (
            format!("{code}_by_year.html"),
            year_series_figure(state, &yearly_series(&incidents, state, years.clone())),
        ),
        (
            format!("{code}_by_month.html"),
            month_series_figure(state, &monthly_series(&incidents, state, years)),
        ),
        (
            format!("{code}_covid_vs_hate_crime.html"),
            covid_scatter_figure(state, &covid_incident_series(&cases, &incidents, state)),
        ),
    ];

    for (file_name, figure) in &figures {
        write_figure_html(&args.output_dir.join(file_name), figure)?;
    }

    log::info!("Wrote {} figures for {}", figures.len(), state.name());
    Ok(())
}

/// Prints predicted and actual counts per state.
///
/// # Errors
///
/// Returns an error if the incidents fail to load or prediction fails.
pub fn predict(multi: &MultiProgress, args: &PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = analysis_config(args)?;
    let incidents = load_incidents(multi, args)?;
    let results = calculate_percent_difference(&incidents, &config)?;

    println!(
        "{:<6} {:>10} {:>10} {:>12}",
        "STATE", "PREDICTED", "ACTUAL", "DIFF %"
    );
    println!("{}", "-".repeat(41));
    for result in &results {
        println!(
            "{:<6} {:>10} {:>10} {:>12.2}",
            result.state.code(),
            result.predicted_count,
            result.actual_count,
            result.percent_difference
        );
    }
    Ok(())
}

/// Redraws the map from an existing percent-difference table.
///
/// # Errors
///
/// Returns an error if the table cannot be read or the map written.
pub fn map(args: &PipelineArgs, input: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = analysis_config(args)?;
    let default_input = args.output_dir.join(PERCENT_DIFF_FILE);
    let input = input.unwrap_or(&default_input);

    let results = read_percent_diff_csv(input)?;
    write_figure_html(
        &args.output_dir.join(MAP_FILE),
        &choropleth_figure(&results, config.target_year),
    )?;
    Ok(())
}

/// Prints the built-in schema table.
pub fn list_schemas() {
    println!("{:<24} {:<10} NAME", "ID", "KIND");
    println!("{}", "-".repeat(60));
    for schema in all_schemas() {
        println!("{:<24} {:<10} {}", schema.id, schema.kind, schema.name);
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the hate-trend analysis pipeline.
//!
//! With a subcommand it runs that step directly; without one it drops into
//! an interactive menu. Uses `indicatif-log-bridge` (via
//! [`hate_trend_cli_utils::init_logger`]) so log lines and progress bars
//! share the terminal cleanly.

mod interactive;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hate_trend_state_models::UsState;

use crate::pipeline::PipelineArgs;

#[derive(Parser)]
#[command(
    name = "hate_trend",
    about = "Compare predicted and actual hate-crime counts against COVID-19 case data"
)]
struct Cli {
    #[command(flatten)]
    args: PipelineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict every state's count, export the percent-difference table,
    /// and draw the choropleth map
    Run,
    /// Draw the yearly, monthly, and COVID-vs-hate-crime figures for a state
    Graphs {
        /// Two-letter state code
        #[arg(long, default_value = "AL", value_parser = pipeline::parse_state)]
        state: UsState,
    },
    /// Print predicted and actual counts per state without writing files
    Predict,
    /// Redraw the choropleth map from an existing percent-difference table
    Map {
        /// Table to read (default: `<output-dir>/percent_diff.csv`)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// List the built-in dataset schemas
    Schemas,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = hate_trend_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi, cli.args);
    };

    match command {
        Commands::Run => pipeline::run(&multi, &cli.args)?,
        Commands::Graphs { state } => pipeline::graphs(&multi, &cli.args, state)?,
        Commands::Predict => pipeline::predict(&multi, &cli.args)?,
        Commands::Map { input } => pipeline::map(&cli.args, input.as_deref())?,
        Commands::Schemas => pipeline::list_schemas(),
    }

    Ok(())
}

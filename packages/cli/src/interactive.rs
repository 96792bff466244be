//! Menu-driven mode used when no subcommand is given.

use dialoguer::{Confirm, Input, Select};
use hate_trend_analytics_models::PredictionFormula;
use hate_trend_cli_utils::MultiProgress;
use hate_trend_state_models::UsState;

use crate::pipeline::{self, PipelineArgs};

enum Action {
    Run,
    Graphs,
    Predict,
    Map,
    Schemas,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Run,
        Self::Graphs,
        Self::Predict,
        Self::Map,
        Self::Schemas,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Run => "Run analysis (table + map)",
            Self::Graphs => "Draw figures for a state",
            Self::Predict => "Print predictions",
            Self::Map => "Redraw map from existing table",
            Self::Schemas => "List dataset schemas",
        }
    }
}

const FORMULAS: &[PredictionFormula] = &[PredictionFormula::Additive, PredictionFormula::Proportional];

/// Prompts for an action and any options it needs, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen step fails.
pub fn run(multi: &MultiProgress, mut args: PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("Hate Crime Trend Analysis");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;
    let action = &Action::ALL[idx];

    if matches!(action, Action::Run | Action::Predict) {
        prompt_prediction_options(&mut args)?;
    }

    match action {
        Action::Run => pipeline::run(multi, &args)?,
        Action::Graphs => {
            let state = prompt_state()?;
            pipeline::graphs(multi, &args, state)?;
        }
        Action::Predict => pipeline::predict(multi, &args)?,
        Action::Map => pipeline::map(&args, None)?,
        Action::Schemas => pipeline::list_schemas(),
    }

    Ok(())
}

fn prompt_state() -> Result<UsState, Box<dyn std::error::Error>> {
    let code: String = Input::new()
        .with_prompt("State code")
        .default("AL".to_string())
        .validate_with(|input: &String| pipeline::parse_state(input).map(|_| ()))
        .interact_text()?;
    Ok(pipeline::parse_state(&code)?)
}

fn prompt_prediction_options(args: &mut PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let customize = Confirm::new()
        .with_prompt("Customize prediction formula and floor?")
        .default(false)
        .interact()?;
    if !customize {
        return Ok(());
    }

    let formula_labels: Vec<String> = FORMULAS.iter().map(ToString::to_string).collect();
    let formula_idx = Select::new()
        .with_prompt("Prediction formula")
        .items(&formula_labels)
        .default(0)
        .interact()?;
    args.formula = Some(FORMULAS[formula_idx]);

    let floor_str: String = Input::new()
        .with_prompt("Minimum prediction (blank for none)")
        .allow_empty(true)
        .validate_with(|input: &String| pipeline::parse_floor_min(input).map(|_| ()))
        .interact_text()?;
    args.floor_min = pipeline::parse_floor_min(&floor_str)?;

    Ok(())
}

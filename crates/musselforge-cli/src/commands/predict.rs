use clap::Args;
use musselforge::core::{Conditions, MortalityPredictor, TreatmentFlag};
use musselforge::scenario::CrossValidator;
use serde::Serialize;

use super::{CliResult, Context};
use crate::output;

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Copper concentration (mg/L)
    #[arg(long, default_value_t = 0.54)]
    pub copper: f64,

    /// Water temperature (°C)
    #[arg(long, default_value_t = 8.0)]
    pub temperature: f64,

    #[arg(long, default_value_t = 7.0)]
    pub ph: f64,

    /// Dissolved oxygen (mg/L)
    #[arg(long, default_value_t = 5.0)]
    pub dissolved_oxygen: f64,

    /// Predict for an untreated tank
    #[arg(long)]
    pub untreated: bool,
}

#[derive(Serialize)]
struct Prediction {
    conditions: Conditions,
    predicted: f64,
    nearest_actual: Option<f64>,
    accuracy: Option<f64>,
}

pub fn run(ctx: &Context, args: PredictArgs) -> CliResult {
    let treatment = if args.untreated {
        TreatmentFlag::Untreated
    } else {
        TreatmentFlag::Treated
    };
    let conditions = Conditions::new(
        args.copper,
        args.temperature,
        args.ph,
        args.dissolved_oxygen,
        treatment,
    );
    let set = ctx.training_set()?;
    let predictor = ctx.predictor(&set)?;
    let neighbor = CrossValidator::new(&predictor, set.rows()).neighbor(&conditions);
    let prediction = Prediction {
        conditions,
        predicted: predictor.predict(&conditions),
        nearest_actual: neighbor.as_ref().map(|n| n.actual),
        accuracy: neighbor.as_ref().map(|n| n.accuracy()),
    };

    if ctx.json() {
        return output::json(&prediction);
    }
    output::field("Predicted mortality rate", format!("{:.4}", prediction.predicted));
    if let (Some(actual), Some(accuracy)) = (prediction.nearest_actual, prediction.accuracy) {
        output::field("Nearest observed rate", format!("{actual:.4}"));
        output::field("Accuracy", format!("{accuracy:.4}"));
    }
    Ok(())
}

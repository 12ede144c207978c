use clap::Args;
use musselforge::scenario::{CrossValidation, DecisionRules, OptimizeOutcome, RulesOptimizer};
use serde::Serialize;

use super::{CliResult, Context};
use crate::output;

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Use the hand-extracted rule tree instead of a freshly fitted one
    #[arg(long)]
    pub reference: bool,
}

pub fn run(ctx: &Context, args: OptimizeArgs) -> CliResult {
    let set = ctx.training_set()?;
    let rules = if args.reference {
        DecisionRules::reference()
    } else {
        let tree = set.surrogate(ctx.config.training.surrogate_max_depth)?;
        DecisionRules::from_tree(&tree)?
    };
    let optimizer = RulesOptimizer::new(
        &ctx.config.optimize,
        &ctx.config.solver,
        &rules,
        set.normalizer(),
    );
    let outcome = optimizer.run()?;
    let predictor = ctx.predictor(&set)?;
    let check = optimizer.cross_check(&outcome, &predictor, set.rows());

    if ctx.json() {
        #[derive(Serialize)]
        struct Report<'a> {
            outcome: &'a OptimizeOutcome,
            cross_check: Option<CrossValidation>,
        }
        return output::json(&Report {
            outcome: &outcome,
            cross_check: check,
        });
    }

    let Some(rounded) = outcome.rounded() else {
        output::no_solution();
        return Ok(());
    };
    output::heading("Optimal conditions");
    println!("{rounded}");
    if let Some(estimate) = outcome.estimate {
        output::field("Rules estimate", format!("{estimate:.2}"));
    }
    if let Some(check) = check {
        output::field(
            "Predicted mortality rate",
            format!("{:.4}", check.agreement.predicted),
        );
        output::field(
            "Predictor agrees",
            if check.agreement.agrees() { "yes" } else { "no" },
        );
        if let Some(neighbor) = check.neighbor {
            output::field(
                "Nearest observation",
                format!("tank {} day {}", neighbor.tank, neighbor.day),
            );
            output::field("Accuracy", format!("{:.4}", neighbor.accuracy()));
        }
    }
    Ok(())
}

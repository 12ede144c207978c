use clap::Args;
use musselforge::scenario::DecisionRules;

use super::{CliResult, Context};
use crate::output;

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Print the hand-extracted rule tree without loading data
    #[arg(long)]
    pub reference: bool,

    /// Depth of the surrogate tree
    #[arg(long)]
    pub max_depth: Option<usize>,
}

pub fn run(ctx: &Context, args: RulesArgs) -> CliResult {
    let rules = if args.reference {
        DecisionRules::reference()
    } else {
        let set = ctx.training_set()?;
        let depth = args
            .max_depth
            .unwrap_or(ctx.config.training.surrogate_max_depth);
        DecisionRules::from_tree(&set.surrogate(depth)?)?
    };

    if ctx.json() {
        return output::json(&rules);
    }
    output::heading(&format!("Decision rules (depth {})", rules.depth()));
    print!("{}", rules.render());
    Ok(())
}

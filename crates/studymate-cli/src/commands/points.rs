use clap::Subcommand;
use serde_json::json;

use super::load_engine;

#[derive(Subcommand)]
pub enum PointsAction {
    /// Show the current balances and level
    Show,
    /// Award points
    Add {
        amount: u32,
        /// Reason recorded with the award
        #[arg(long, default_value = "manual")]
        reason: String,
    },
    /// Spend points from the spendable balance
    Deduct {
        amount: u32,
        /// Reason recorded with the deduction
        #[arg(long, default_value = "manual")]
        reason: String,
    },
}

pub fn run(action: PointsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = load_engine()?;

    match action {
        PointsAction::Show => {
            let state = engine.state();
            let out = json!({
                "points": state.points,
                "spendable_points": state.spendable_points,
                "level": state.level,
                "level_progress": engine.level_progress(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        PointsAction::Add { amount, reason } => {
            let result = engine.add_points(amount, &reason);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        PointsAction::Deduct { amount, reason } => {
            let spendable = engine.deduct_points(amount, &reason);
            println!("{}", serde_json::to_string_pretty(&json!({ "spendable_points": spendable }))?);
        }
    }
    Ok(())
}

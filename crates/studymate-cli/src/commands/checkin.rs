use clap::Subcommand;

use super::load_engine;

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Check in for today
    Today,
    /// Show the recorded check-in dates
    History,
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = load_engine()?;

    match action {
        CheckinAction::Today => {
            let result = engine.check_in();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        CheckinAction::History => {
            println!("{}", serde_json::to_string_pretty(engine.check_in_history())?);
        }
    }
    Ok(())
}

use clap::Subcommand;
use serde_json::json;

use super::load_engine;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's summary
    Summary,
    /// Minutes per day for the current week
    Weekly,
    /// Total minutes for the current month
    Monthly,
    /// The three most productive hours of day
    Hours,
    /// Level and progress to the next one
    Level,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = load_engine()?;

    match action {
        StatsAction::Summary => {
            println!("{}", serde_json::to_string_pretty(&engine.stats_summary())?);
        }
        StatsAction::Weekly => {
            println!("{}", serde_json::to_string_pretty(&engine.weekly_data())?);
        }
        StatsAction::Monthly => {
            let out = json!({ "monthly_minutes": engine.monthly_minutes() });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        StatsAction::Hours => {
            println!("{}", serde_json::to_string_pretty(&engine.best_study_hours())?);
        }
        StatsAction::Level => {
            println!("{}", serde_json::to_string_pretty(&engine.level_progress())?);
        }
    }
    Ok(())
}

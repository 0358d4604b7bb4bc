use clap::Subcommand;

use super::load_engine;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// Every achievement with its unlock state and progress
    List,
    /// Progress toward one achievement
    Progress {
        /// Achievement id (e.g. "study_1hour")
        id: String,
    },
    /// The most recently unlocked achievements
    Recent {
        #[arg(default_value_t = 3)]
        count: usize,
    },
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = load_engine()?;

    match action {
        AchievementsAction::List => {
            println!("{}", serde_json::to_string_pretty(&engine.achievement_statuses())?);
        }
        AchievementsAction::Progress { id } => {
            println!("{}", serde_json::to_string_pretty(&engine.achievement_progress(&id))?);
        }
        AchievementsAction::Recent { count } => {
            println!("{}", serde_json::to_string_pretty(&engine.recent_achievements(count))?);
        }
    }
    Ok(())
}

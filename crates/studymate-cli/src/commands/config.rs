use clap::Subcommand;
use studymate_core::Prefs;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a preference value
    Get {
        /// Preference key (e.g. "daily_goal_minutes")
        key: String,
    },
    /// Set a preference value
    Set {
        /// Preference key
        key: String,
        /// New value
        value: String,
    },
    /// List all preferences
    List,
    /// Reset preferences to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let prefs = Prefs::load()?;
            match prefs.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut prefs = Prefs::load()?;
            prefs.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            let prefs = Prefs::load()?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        ConfigAction::Reset => {
            let prefs = Prefs::default();
            prefs.save()?;
            println!("preferences reset to defaults");
        }
    }
    Ok(())
}

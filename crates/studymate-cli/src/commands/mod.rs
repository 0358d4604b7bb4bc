pub mod achievements;
pub mod checkin;
pub mod config;
pub mod points;
pub mod session;
pub mod stats;

use studymate_core::{Database, Engine};

/// Open the database and load the engine over it.
pub fn load_engine() -> Result<Engine, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(Engine::load(Box::new(db))?)
}

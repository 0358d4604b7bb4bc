use clap::Subcommand;
use studymate_core::{FrameClassification, FrameLabel};

use super::load_engine;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Log a finished block of study minutes
    Study {
        /// Minutes to record
        minutes: u32,
    },
    /// Feed classified frame labels through the supervision monitor
    Frames {
        /// Labels in order (learning / distracted / unknown)
        labels: Vec<String>,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = load_engine()?;

    match action {
        SessionAction::Study { minutes } => {
            engine.start_session();
            for _ in 0..minutes {
                engine.record_study_minute();
            }
            engine.stop_session();
        }
        SessionAction::Frames { labels } => {
            engine.start_session();
            for label in &labels {
                let frame = FrameClassification {
                    label: FrameLabel::parse(label),
                    reason: String::new(),
                };
                engine.classify_frame(&frame);
            }
            engine.stop_session();
        }
    }

    // Everything that happened, check-in included, as one event log.
    let events = engine.drain_events();
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

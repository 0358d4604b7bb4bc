//! Distraction/focus supervision monitor.
//!
//! A short-horizon state machine over the live per-frame classification
//! stream. The vision backend labels each frame `learning`,
//! `distracted`, or `unknown`; the monitor turns runs of those labels
//! into penalty and reward verdicts:
//!
//! - two distracted frames in a row trigger a penalty and an alert,
//! - ten learning frames in a row earn a small focus bonus,
//! - `unknown` is neutral: it breaks a distraction run without
//!   rewarding anything.
//!
//! Frames are processed synchronously -- nothing queues. The monitor
//! state is ephemeral per session; ending a session discards it.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distracted frames in a row before a penalty fires.
pub const DISTRACTION_ALERT_THRESHOLD: u32 = 2;

/// Learning frames in a row before the focus bonus fires.
pub const FOCUS_BONUS_THRESHOLD: u32 = 10;

/// Spendable points deducted per distraction penalty.
pub const DISTRACTION_PENALTY: u32 = 5;

/// Points awarded per sustained-focus bonus.
pub const FOCUS_BONUS: u32 = 2;

const REMINDER_MESSAGES: [&str; 4] = [
    "Caught you drifting -- let's get back to it!",
    "Eyes on the books! You were doing so well.",
    "Looks like something stole your attention. Back to studying?",
    "A little distracted? Take a breath and refocus.",
];

/// Per-frame label from the vision backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameLabel {
    Learning,
    Distracted,
    Unknown,
}

impl FrameLabel {
    /// Parse a backend label. Anything that is not `distracted` or
    /// `unknown` counts as learning.
    pub fn parse(label: &str) -> FrameLabel {
        match label {
            "distracted" => FrameLabel::Distracted,
            "unknown" => FrameLabel::Unknown,
            _ => FrameLabel::Learning,
        }
    }
}

/// One classified frame as delivered by the backend: an opaque label
/// plus its free-text reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameClassification {
    pub label: FrameLabel,
    pub reason: String,
}

/// An alert dispatched when the distraction threshold is crossed.
///
/// The token is the contract: every alert carries a fresh unique one
/// so downstream consumers can deduplicate deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTrigger {
    pub token: Uuid,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl AlertTrigger {
    fn new() -> Self {
        let message = REMINDER_MESSAGES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(REMINDER_MESSAGES[0]);
        Self {
            token: Uuid::new_v4(),
            message: message.to_string(),
            at: Utc::now(),
        }
    }
}

/// What the monitor decided for one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameVerdict {
    /// Nothing to do for this frame.
    None,
    /// Distraction threshold crossed: deduct the penalty and alert.
    Penalize { alert: AlertTrigger },
    /// Sustained focus: award the bonus.
    Reward,
}

/// Ephemeral per-session monitor state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupervisionMonitor {
    frame_count: u64,
    distraction_streak: u32,
    focus_streak: u32,
}

impl SupervisionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn distraction_streak(&self) -> u32 {
        self.distraction_streak
    }

    /// Feed one frame label through the state machine.
    pub fn observe(&mut self, label: FrameLabel) -> FrameVerdict {
        self.frame_count += 1;
        match label {
            FrameLabel::Distracted => {
                self.distraction_streak += 1;
                if self.distraction_streak >= DISTRACTION_ALERT_THRESHOLD {
                    self.distraction_streak = 0;
                    return FrameVerdict::Penalize {
                        alert: AlertTrigger::new(),
                    };
                }
                FrameVerdict::None
            }
            FrameLabel::Unknown => {
                // Neutral: clears the distraction run, earns nothing.
                self.distraction_streak = 0;
                FrameVerdict::None
            }
            FrameLabel::Learning => {
                self.distraction_streak = 0;
                self.focus_streak += 1;
                if self.focus_streak >= FOCUS_BONUS_THRESHOLD {
                    self.focus_streak = 0;
                    return FrameVerdict::Reward;
                }
                FrameVerdict::None
            }
        }
    }
}

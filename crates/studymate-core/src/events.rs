use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every externally visible state change produces an Event.
/// The presentation layer polls for events and renders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PointsAwarded {
        amount: u32,
        reason: String,
        total_points: u64,
        at: DateTime<Utc>,
    },
    PointsDeducted {
        amount: u32,
        reason: String,
        spendable_points: u64,
        at: DateTime<Utc>,
    },
    LeveledUp {
        old_level: u32,
        new_level: u32,
        title: String,
        at: DateTime<Utc>,
    },
    CheckedIn {
        bonus: u32,
        consecutive_days: u32,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        id: String,
        name: String,
        points_reward: u32,
        at: DateTime<Utc>,
    },
    /// The distraction threshold was crossed.
    DistractionAlert {
        token: Uuid,
        message: String,
        at: DateTime<Utc>,
    },
    /// Sustained focus earned the supervision bonus.
    FocusBonusAwarded {
        amount: u32,
        at: DateTime<Utc>,
    },
    /// A rest break started or ended.
    RestToggled {
        resting: bool,
        at: DateTime<Utc>,
    },
}

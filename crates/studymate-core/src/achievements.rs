//! Achievement engine: a data-driven unlock catalog.
//!
//! The catalog is a fixed table of threshold conditions evaluated
//! against the progress state. A sweep walks the table in order,
//! unlocks anything newly satisfied exactly once, and grants the
//! attached point reward. Unlocks are append-only and never revoked.

use serde::Serialize;
use tracing::info;

use crate::progress::ProgressState;

/// A threshold predicate over the progress state.
///
/// Each variant pairs a metric with its target, which also yields the
/// progress-percent display for locked entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "snake_case")]
pub enum Condition {
    /// `total_study_minutes >= n`
    StudyMinutes(u64),
    /// `consecutive_days >= n`
    Streak(u32),
    /// `early_end_rest_count >= n`
    EarlyRest(u32),
    /// `level >= n`
    Level(u32),
    /// `points >= n`
    Points(u64),
}

impl Condition {
    fn current_and_target(&self, state: &ProgressState) -> (u64, u64) {
        match *self {
            Condition::StudyMinutes(n) => (state.total_study_minutes, n),
            Condition::Streak(n) => (u64::from(state.consecutive_days), u64::from(n)),
            Condition::EarlyRest(n) => (u64::from(state.early_end_rest_count), u64::from(n)),
            Condition::Level(n) => (u64::from(state.level), u64::from(n)),
            Condition::Points(n) => (state.points, n),
        }
    }

    /// Hard unlock boundary.
    pub fn met(&self, state: &ProgressState) -> bool {
        let (current, target) = self.current_and_target(state);
        current >= target
    }

    /// Progress toward the threshold as a percentage, capped at 100.
    /// The cap is display-only: crossing 100 here does not unlock.
    pub fn progress_percent(&self, state: &ProgressState) -> f64 {
        let (current, target) = self.current_and_target(state);
        if target == 0 {
            return 100.0;
        }
        ((current as f64 / target as f64) * 100.0).min(100.0)
    }
}

/// One entry of the static achievement catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points_reward: u32,
    pub condition: Condition,
}

/// The full catalog, in sweep order. Order is part of the contract:
/// unlock order is preserved for recent-achievement queries, and a
/// reward granted mid-sweep can satisfy a later points entry within
/// the same sweep.
pub const CATALOG: [AchievementDef; 16] = [
    AchievementDef {
        id: "first_study",
        name: "First Steps",
        description: "Record your first study minute",
        icon: "🎯",
        points_reward: 10,
        condition: Condition::StudyMinutes(1),
    },
    AchievementDef {
        id: "study_30min",
        name: "Focus Rookie",
        description: "Study for 30 minutes in total",
        icon: "⏱️",
        points_reward: 20,
        condition: Condition::StudyMinutes(30),
    },
    AchievementDef {
        id: "study_1hour",
        name: "One-Hour Challenge",
        description: "Study for 1 hour in total",
        icon: "🕐",
        points_reward: 30,
        condition: Condition::StudyMinutes(60),
    },
    AchievementDef {
        id: "study_5hours",
        name: "Focus Adept",
        description: "Study for 5 hours in total",
        icon: "🎖️",
        points_reward: 50,
        condition: Condition::StudyMinutes(300),
    },
    AchievementDef {
        id: "study_10hours",
        name: "Skilled Learner",
        description: "Study for 10 hours in total",
        icon: "🏅",
        points_reward: 80,
        condition: Condition::StudyMinutes(600),
    },
    AchievementDef {
        id: "study_24hours",
        name: "Day and Night",
        description: "Study for 24 hours in total",
        icon: "🌙",
        points_reward: 150,
        condition: Condition::StudyMinutes(1440),
    },
    AchievementDef {
        id: "checkin_3days",
        name: "Three-Day Streak",
        description: "Check in 3 days in a row",
        icon: "📅",
        points_reward: 15,
        condition: Condition::Streak(3),
    },
    AchievementDef {
        id: "checkin_7days",
        name: "Week Achiever",
        description: "Check in 7 days in a row",
        icon: "🗓️",
        points_reward: 30,
        condition: Condition::Streak(7),
    },
    AchievementDef {
        id: "checkin_14days",
        name: "Fortnight Keeper",
        description: "Check in 14 days in a row",
        icon: "📆",
        points_reward: 60,
        condition: Condition::Streak(14),
    },
    AchievementDef {
        id: "checkin_30days",
        name: "Star of the Month",
        description: "Check in 30 days in a row",
        icon: "🌟",
        points_reward: 120,
        condition: Condition::Streak(30),
    },
    AchievementDef {
        id: "early_rest_5",
        name: "Discipline Rising",
        description: "End a rest break early 5 times",
        icon: "💪",
        points_reward: 20,
        condition: Condition::EarlyRest(5),
    },
    AchievementDef {
        id: "early_rest_20",
        name: "Discipline Champion",
        description: "End a rest break early 20 times",
        icon: "👊",
        points_reward: 60,
        condition: Condition::EarlyRest(20),
    },
    AchievementDef {
        id: "level_5",
        name: "Making Progress",
        description: "Reach level 5",
        icon: "🎯",
        points_reward: 50,
        condition: Condition::Level(5),
    },
    AchievementDef {
        id: "level_10",
        name: "Peak Performer",
        description: "Reach level 10",
        icon: "🏆",
        points_reward: 100,
        condition: Condition::Level(10),
    },
    AchievementDef {
        id: "points_1000",
        name: "Thousand Club",
        description: "Earn 1000 lifetime points",
        icon: "💰",
        points_reward: 100,
        condition: Condition::Points(1000),
    },
    AchievementDef {
        id: "points_5000",
        name: "Point Hoarder",
        description: "Earn 5000 lifetime points",
        icon: "💎",
        points_reward: 200,
        condition: Condition::Points(5000),
    },
];

/// Look up a catalog entry by id.
pub fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Unlock state and progress display for one achievement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AchievementProgress {
    pub unlocked: bool,
    /// 0-100. Capped at 100 even while still locked.
    pub percent: f64,
}

/// Full status row for the catalog view.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points_reward: u32,
    pub unlocked: bool,
    pub percent: f64,
}

/// Evaluate the catalog against the current state, unlocking anything
/// newly satisfied and granting its reward. Returns the definitions
/// unlocked by this sweep, in catalog order. Already-unlocked entries
/// are skipped; an unlock can never re-trigger.
pub fn sweep(state: &mut ProgressState) -> Vec<&'static AchievementDef> {
    let mut unlocked = Vec::new();
    for def in CATALOG.iter() {
        if state.achievements.iter().any(|id| id == def.id) {
            continue;
        }
        if def.condition.met(state) {
            state.achievements.push(def.id.to_string());
            if def.points_reward > 0 {
                state.add_points(def.points_reward, &format!("achievement_{}", def.id));
            }
            info!(id = def.id, reward = def.points_reward, "achievement unlocked");
            unlocked.push(def);
        }
    }
    unlocked
}

/// Unlock state and progress display for `id`.
///
/// Unlocked entries always report 100. Unknown ids report locked at 0.
pub fn progress_of(state: &ProgressState, id: &str) -> AchievementProgress {
    if state.achievements.iter().any(|a| a == id) {
        return AchievementProgress {
            unlocked: true,
            percent: 100.0,
        };
    }
    match find(id) {
        Some(def) => AchievementProgress {
            unlocked: false,
            percent: def.condition.progress_percent(state),
        },
        None => AchievementProgress {
            unlocked: false,
            percent: 0.0,
        },
    }
}

/// Status of every catalog entry, in catalog order.
pub fn statuses(state: &ProgressState) -> Vec<AchievementStatus> {
    CATALOG
        .iter()
        .map(|def| {
            let progress = progress_of(state, def.id);
            AchievementStatus {
                id: def.id,
                name: def.name,
                description: def.description,
                icon: def.icon,
                points_reward: def.points_reward,
                unlocked: progress.unlocked,
                percent: progress.percent,
            }
        })
        .collect()
}

/// The most recently unlocked achievements, newest last.
pub fn recent(state: &ProgressState, count: usize) -> Vec<&'static AchievementDef> {
    let start = state.achievements.len().saturating_sub(count);
    state.achievements[start..]
        .iter()
        .filter_map(|id| find(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn study_30min_unlocks_exactly_once() {
        let mut state = ProgressState::new();
        state.total_study_minutes = 30;

        let first = sweep(&mut state);
        assert!(first.iter().any(|d| d.id == "study_30min"));

        let second = sweep(&mut state);
        assert!(second.is_empty());
        assert_eq!(
            state.achievements.iter().filter(|id| *id == "study_30min").count(),
            1
        );
    }

    #[test]
    fn sweep_grants_the_reward() {
        let mut state = ProgressState::new();
        state.total_study_minutes = 1;
        sweep(&mut state);
        // first_study reward.
        assert_eq!(state.points, 10);
        assert_eq!(state.spendable_points, 10);
    }

    #[test]
    fn first_study_requires_a_minute() {
        let mut state = ProgressState::new();
        assert!(sweep(&mut state).is_empty());
        assert_eq!(progress_of(&state, "first_study").percent, 0.0);

        state.total_study_minutes = 1;
        assert_eq!(progress_of(&state, "first_study").percent, 100.0);
    }

    #[test]
    fn progress_is_capped_but_not_auto_unlocked() {
        let mut state = ProgressState::new();
        // Well past the threshold, but never swept.
        state.points = 1500;
        let progress = progress_of(&state, "points_1000");
        assert!(!progress.unlocked);
        assert_eq!(progress.percent, 100.0);
    }

    #[test]
    fn partial_progress_reports_the_ratio() {
        let mut state = ProgressState::new();
        state.consecutive_days = 2;
        let progress = progress_of(&state, "checkin_3days");
        assert!(!progress.unlocked);
        assert!((progress.percent - 66.666).abs() < 0.01);
    }

    #[test]
    fn unknown_id_is_locked_at_zero() {
        let state = ProgressState::new();
        let progress = progress_of(&state, "no_such_achievement");
        assert!(!progress.unlocked);
        assert_eq!(progress.percent, 0.0);
    }

    #[test]
    fn reward_cascade_within_one_sweep() {
        let mut state = ProgressState::new();
        // 990 points: points_1000 is locked until rewards granted
        // earlier in the same sweep push the total past it.
        state.points = 990;
        state.level = crate::levels::level_for(state.points).level;
        state.total_study_minutes = 30;
        let unlocked = sweep(&mut state);
        let ids: Vec<&str> = unlocked.iter().map(|d| d.id).collect();
        assert!(ids.contains(&"points_1000"));
    }

    #[test]
    fn statuses_cover_the_whole_catalog() {
        let mut state = ProgressState::new();
        state.total_study_minutes = 45;
        sweep(&mut state);

        let all = statuses(&state);
        assert_eq!(all.len(), CATALOG.len());
        let row = all.iter().find(|s| s.id == "study_30min").unwrap();
        assert!(row.unlocked);
        assert_eq!(row.percent, 100.0);
        let row = all.iter().find(|s| s.id == "study_1hour").unwrap();
        assert!(!row.unlocked);
        assert!(row.percent < 100.0);
    }

    #[test]
    fn recent_preserves_unlock_order() {
        let mut state = ProgressState::new();
        state.total_study_minutes = 60;
        sweep(&mut state);
        let recent_two = recent(&state, 2);
        assert_eq!(recent_two.len(), 2);
        assert_eq!(recent_two[0].id, "study_30min");
        assert_eq!(recent_two[1].id, "study_1hour");
    }
}

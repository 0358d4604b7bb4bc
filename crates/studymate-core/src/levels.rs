//! Level table and level calculation.
//!
//! Levels are derived from the lifetime point total against a static
//! ordered table. `min_points` is strictly increasing and starts at 0,
//! so every point total maps to exactly one level.

use serde::Serialize;

/// One entry in the static level table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelDef {
    pub level: u32,
    pub name: &'static str,
    pub min_points: u64,
    pub icon: &'static str,
}

/// The static level ladder, ordered by `min_points`.
pub const LEVELS: [LevelDef; 10] = [
    LevelDef { level: 1, name: "Study Novice", min_points: 0, icon: "🌱" },
    LevelDef { level: 2, name: "Junior Scholar", min_points: 100, icon: "🌿" },
    LevelDef { level: 3, name: "Diligent Apprentice", min_points: 300, icon: "🌳" },
    LevelDef { level: 4, name: "Focus Adept", min_points: 600, icon: "⭐" },
    LevelDef { level: 5, name: "Skilled Learner", min_points: 1000, icon: "🌟" },
    LevelDef { level: 6, name: "Knowledge Explorer", min_points: 1500, icon: "💫" },
    LevelDef { level: 7, name: "Scholar in Training", min_points: 2200, icon: "🔥" },
    LevelDef { level: 8, name: "Study Master", min_points: 3000, icon: "👑" },
    LevelDef { level: 9, name: "Knowledge Sovereign", min_points: 4000, icon: "💎" },
    LevelDef { level: 10, name: "Legendary Scholar", min_points: 5500, icon: "🏆" },
];

/// Map a point total to its level descriptor.
///
/// Scans the table from the highest threshold downward and returns the
/// first entry whose `min_points` is at or below `points`. The lowest
/// threshold is 0, so every total matches.
pub fn level_for(points: u64) -> LevelDef {
    for def in LEVELS.iter().rev() {
        if points >= def.min_points {
            return *def;
        }
    }
    LEVELS[0]
}

/// Points required to reach `level + 1`, or `None` at the maximum level.
pub fn points_to_next(level: u32) -> Option<u64> {
    LEVELS.iter().find(|d| d.level == level + 1).map(|d| d.min_points)
}

//! Progress ledger: the durable identity of one user.
//!
//! `ProgressState` owns the cumulative point total, the spendable
//! balance, the derived level, the check-in streak, the unlocked
//! achievement ids, and the bounded daily-record history. The lifetime
//! total (`points`) never decreases; penalties only debit
//! `spendable_points`, which is floored at 0.
//!
//! The state is a plain struct mutated through `&mut self` -- one
//! logical owner serializes the per-minute tick, the per-frame
//! callback, and UI requests. Persistence is an injected collaborator
//! (see [`crate::storage::ProgressStore`]), never a side effect here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::levels::{self, LevelDef};
use crate::telemetry::DailyRecord;

/// Most recent check-in dates retained in `check_in_history`.
pub const CHECK_IN_HISTORY_LIMIT: usize = 30;

/// Most recent daily records retained in `daily_records`.
pub const DAILY_RECORD_LIMIT: usize = 60;

/// Daily check-in bonus: `10 + 2 * consecutive_days`, capped here.
pub const CHECK_IN_BONUS_CAP: u32 = 50;

/// Long-lived per-user progress state.
///
/// Every field round-trips through the persistence layer; fields added
/// later default cleanly when loading older snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressState {
    /// Lifetime "rank" currency. Monotonically non-decreasing.
    pub points: u64,
    /// Spendable balance. Mirrors `points` increments but is debited
    /// independently by penalties and out-of-scope consumers.
    pub spendable_points: u64,
    /// Derived from `points`; recomputed on every award.
    pub level: u32,
    pub total_study_minutes: u64,
    pub today_study_minutes: u32,
    /// Check-in streak length in consecutive calendar days.
    pub consecutive_days: u32,
    pub last_check_in_date: Option<NaiveDate>,
    /// Deduplicated, oldest dropped first past the limit.
    pub check_in_history: Vec<NaiveDate>,
    /// Unlocked achievement ids, append-only, in unlock order.
    pub achievements: Vec<String>,
    pub early_end_rest_count: u32,
    pub first_study_date: Option<NaiveDate>,
    pub last_study_date: Option<NaiveDate>,
    /// One record per calendar day, unique by date, bounded by age.
    pub daily_records: Vec<DailyRecord>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            points: 0,
            spendable_points: 0,
            level: 1,
            total_study_minutes: 0,
            today_study_minutes: 0,
            consecutive_days: 0,
            last_check_in_date: None,
            check_in_history: Vec::new(),
            achievements: Vec::new(),
            early_end_rest_count: 0,
            first_study_date: None,
            last_study_date: None,
            daily_records: Vec::new(),
        }
    }
}

/// Outcome of a point award.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AddPointsResult {
    pub leveled_up: bool,
    pub old_level: u32,
    pub new_level: LevelDef,
    pub total_points: u64,
}

/// Outcome of a daily check-in.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckInResult {
    /// False when already checked in today.
    pub is_new: bool,
    pub bonus: u32,
    pub consecutive_days: u32,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Award `amount` points to both the lifetime total and the
    /// spendable balance, then recompute the level.
    ///
    /// Amounts are unsigned by construction: a negative award is a
    /// caller bug the type system rejects outright. Penalties go
    /// through [`ProgressState::deduct_points`] instead.
    pub fn add_points(&mut self, amount: u32, reason: &str) -> AddPointsResult {
        let old_level = self.level;
        self.points += u64::from(amount);
        self.spendable_points += u64::from(amount);

        let new_level = levels::level_for(self.points);
        self.level = new_level.level;

        debug!(
            amount,
            reason,
            total = self.points,
            spendable = self.spendable_points,
            "points added"
        );

        AddPointsResult {
            leveled_up: new_level.level > old_level,
            old_level,
            new_level,
            total_points: self.points,
        }
    }

    /// Debit the spendable balance, floored at 0.
    ///
    /// Never touches `points` or `level`: the level reflects lifetime
    /// achievement, not the current balance. Returns the new balance.
    pub fn deduct_points(&mut self, amount: u32, reason: &str) -> u64 {
        self.spendable_points = self.spendable_points.saturating_sub(u64::from(amount));
        debug!(amount, reason, spendable = self.spendable_points, "points deducted");
        self.spendable_points
    }

    /// Daily check-in, idempotent per calendar date.
    ///
    /// Date rollover is detected on every call, not only on the
    /// first-check-in branch: observing a new date always resets
    /// `today_study_minutes` before anything else.
    ///
    /// Streak rule: a gap of exactly one day extends the streak; any
    /// other gap (including no prior check-in) resets it to 1.
    pub fn check_in(&mut self, today: NaiveDate) -> CheckInResult {
        let is_new = self.last_check_in_date != Some(today);
        if is_new {
            self.today_study_minutes = 0;
        }

        if !is_new {
            return CheckInResult {
                is_new: false,
                bonus: 0,
                consecutive_days: self.consecutive_days,
            };
        }

        match self.last_check_in_date {
            Some(last) if today.signed_duration_since(last).num_days() == 1 => {
                self.consecutive_days += 1;
            }
            _ => self.consecutive_days = 1,
        }
        self.last_check_in_date = Some(today);

        if !self.check_in_history.contains(&today) {
            self.check_in_history.push(today);
            if self.check_in_history.len() > CHECK_IN_HISTORY_LIMIT {
                let overflow = self.check_in_history.len() - CHECK_IN_HISTORY_LIMIT;
                self.check_in_history.drain(..overflow);
            }
        }

        let bonus = (10 + 2 * self.consecutive_days).min(CHECK_IN_BONUS_CAP);
        self.add_points(bonus, "check_in_bonus");

        debug!(bonus, streak = self.consecutive_days, "daily check-in");

        CheckInResult {
            is_new: true,
            bonus,
            consecutive_days: self.consecutive_days,
        }
    }

    /// Count a rest break the user ended early.
    pub fn record_early_rest(&mut self) {
        self.early_end_rest_count += 1;
    }
}

//! The engine facade: one owner for all progress mutations.
//!
//! `Engine` owns the [`ProgressState`], the per-session supervision
//! monitor, and the injected persistence store. Every mutating
//! operation takes `&mut self`, so a single owner serializes the
//! per-minute study tick, the per-frame classifier callback, and
//! UI-triggered requests -- callers that need sharing wrap the engine
//! in a mutex.
//!
//! Mutations apply in memory first and then attempt a synchronous
//! save. A failed save never loses the in-memory change: the engine
//! marks itself dirty and the caller retries with [`Engine::flush`].
//!
//! Externally visible changes are queued as [`Event`]s; the
//! presentation layer drains them with [`Engine::drain_events`].

use chrono::{Local, NaiveDate, Timelike, Utc};
use tracing::warn;

use crate::achievements::{self, AchievementDef, AchievementProgress, AchievementStatus};
use crate::error::{CoreError, StorageError};
use crate::events::Event;
use crate::monitor::{
    FrameClassification, FrameVerdict, SupervisionMonitor, DISTRACTION_PENALTY, FOCUS_BONUS,
};
use crate::progress::{AddPointsResult, CheckInResult, ProgressState};
use crate::stats::{self, DayStat, HourStat, LevelProgress, StatsSummary};
use crate::storage::ProgressStore;
use crate::telemetry::StudyMinuteResult;

/// Points awarded for ending a rest break early.
pub const EARLY_REST_AWARD: u32 = 5;

/// Engagement and progression engine for one user.
pub struct Engine {
    state: ProgressState,
    /// Armed while a monitoring session is active.
    monitor: Option<SupervisionMonitor>,
    resting: bool,
    store: Box<dyn ProgressStore>,
    events: Vec<Event>,
    dirty: bool,
}

impl Engine {
    /// Create an engine over an explicit state.
    pub fn new(store: Box<dyn ProgressStore>, state: ProgressState) -> Self {
        Self {
            state,
            monitor: None,
            resting: false,
            store,
            events: Vec::new(),
            dirty: false,
        }
    }

    /// Load persisted state from the store, starting fresh when
    /// nothing was saved yet.
    ///
    /// # Errors
    /// Propagates the load failure; callers may fall back to
    /// `Engine::new(store, ProgressState::new())` and keep operating
    /// in memory.
    pub fn load(store: Box<dyn ProgressStore>) -> Result<Self, CoreError> {
        let state = store.load()?.unwrap_or_default();
        Ok(Self::new(store, state))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn session_active(&self) -> bool {
        self.monitor.is_some()
    }

    pub fn resting(&self) -> bool {
        self.resting
    }

    /// True when the last save failed and a retry is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats_summary(&self) -> StatsSummary {
        stats::summary(&self.state, today())
    }

    pub fn weekly_data(&self) -> Vec<DayStat> {
        stats::weekly(&self.state, today())
    }

    pub fn monthly_minutes(&self) -> u64 {
        stats::monthly_minutes(&self.state, today())
    }

    pub fn best_study_hours(&self) -> Vec<HourStat> {
        stats::best_study_hours(&self.state)
    }

    pub fn level_progress(&self) -> LevelProgress {
        stats::level_progress(&self.state)
    }

    pub fn achievement_statuses(&self) -> Vec<AchievementStatus> {
        achievements::statuses(&self.state)
    }

    pub fn achievement_progress(&self, id: &str) -> AchievementProgress {
        achievements::progress_of(&self.state, id)
    }

    pub fn recent_achievements(&self, count: usize) -> Vec<&'static AchievementDef> {
        achievements::recent(&self.state, count)
    }

    pub fn check_in_history(&self) -> &[NaiveDate] {
        &self.state.check_in_history
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Start a monitoring session: stamp the study dates, perform the
    /// daily check-in, and arm the supervision monitor.
    pub fn start_session(&mut self) -> CheckInResult {
        let day = today();
        if self.state.first_study_date.is_none() {
            self.state.first_study_date = Some(day);
        }
        self.state.last_study_date = Some(day);
        self.monitor = Some(SupervisionMonitor::new());
        self.resting = false;

        let result = self.check_in_at(day);
        self.sweep_inner();
        self.autosave();
        result
    }

    /// End the session. Monitor state is discarded, not persisted.
    pub fn stop_session(&mut self) {
        self.monitor = None;
        self.resting = false;
    }

    /// Toggle rest mode within an active session. Entering rest
    /// suspends telemetry and supervision and resets the monitor's
    /// streak counters. Leaving rest before the break ran its course
    /// counts as ending it early: the self-discipline counter and a
    /// small award. Returns the new rest state, or `None` without an
    /// active session.
    pub fn toggle_rest(&mut self) -> Option<bool> {
        self.monitor.as_ref()?;
        self.resting = !self.resting;
        if self.resting {
            // Distraction and focus runs do not survive into a break.
            self.monitor = Some(SupervisionMonitor::new());
        } else {
            self.state.record_early_rest();
            let old_level = self.state.level;
            self.state.add_points(EARLY_REST_AWARD, "early_rest");
            self.events.push(Event::PointsAwarded {
                amount: EARLY_REST_AWARD,
                reason: "early_rest".to_string(),
                total_points: self.state.points,
                at: Utc::now(),
            });
            self.push_level_event(old_level);
            self.sweep_inner();
        }
        self.events.push(Event::RestToggled {
            resting: self.resting,
            at: Utc::now(),
        });
        self.autosave();
        Some(self.resting)
    }

    // ── Ledger operations ────────────────────────────────────────────

    /// Award points. Amounts are unsigned; penalties go through
    /// [`Engine::deduct_points`].
    pub fn add_points(&mut self, amount: u32, reason: &str) -> AddPointsResult {
        let old_level = self.state.level;
        let result = self.state.add_points(amount, reason);
        self.events.push(Event::PointsAwarded {
            amount,
            reason: reason.to_string(),
            total_points: result.total_points,
            at: Utc::now(),
        });
        self.push_level_event(old_level);
        self.sweep_inner();
        self.autosave();
        result
    }

    /// Debit the spendable balance, floored at 0. Returns the new
    /// balance.
    pub fn deduct_points(&mut self, amount: u32, reason: &str) -> u64 {
        let spendable = self.state.deduct_points(amount, reason);
        self.events.push(Event::PointsDeducted {
            amount,
            reason: reason.to_string(),
            spendable_points: spendable,
            at: Utc::now(),
        });
        self.autosave();
        spendable
    }

    /// Daily check-in. Idempotent per calendar day.
    pub fn check_in(&mut self) -> CheckInResult {
        let result = self.check_in_at(today());
        self.sweep_inner();
        self.autosave();
        result
    }

    // ── Telemetry feeds ──────────────────────────────────────────────

    /// Record one elapsed study minute. Ignored unless a session is
    /// active and not resting.
    ///
    /// The base +1 award is not queued as an event: it fires every
    /// minute and the returned [`StudyMinuteResult`] already carries
    /// it. Only boundary bonuses and level-ups reach the event log.
    pub fn record_study_minute(&mut self) -> Option<StudyMinuteResult> {
        if self.monitor.is_none() || self.resting {
            return None;
        }
        let old_level = self.state.level;
        let result = self.state.record_study_minute(today(), hour_of_day());
        if result.continuous_bonus {
            self.events.push(Event::PointsAwarded {
                amount: 10,
                reason: "continuous_learning_bonus".to_string(),
                total_points: self.state.points,
                at: Utc::now(),
            });
        }
        self.push_level_event(old_level);
        self.sweep_inner();
        self.autosave();
        Some(result)
    }

    /// Record one emotion sample. Ignored unless a session is active
    /// and not resting; malformed samples are dropped inside the
    /// aggregator.
    pub fn record_emotion(&mut self, label: &str, confidence: f64) {
        if self.monitor.is_none() || self.resting {
            return;
        }
        self.state.record_emotion(today(), label, confidence);
        self.autosave();
    }

    /// Record a no-face sample. Ignored unless a session is active and
    /// not resting.
    pub fn record_no_face(&mut self) {
        if self.monitor.is_none() || self.resting {
            return;
        }
        self.state.record_no_face(today());
        self.autosave();
    }

    /// Feed one classified frame to the supervision monitor.
    ///
    /// Frames arriving while no session is active, or while resting,
    /// are discarded -- never buffered.
    pub fn classify_frame(&mut self, frame: &FrameClassification) -> FrameVerdict {
        let verdict = match self.monitor.as_mut() {
            Some(monitor) if !self.resting => monitor.observe(frame.label),
            _ => return FrameVerdict::None,
        };

        match &verdict {
            FrameVerdict::Penalize { alert } => {
                let spendable = self
                    .state
                    .deduct_points(DISTRACTION_PENALTY, "distraction_penalty");
                self.events.push(Event::PointsDeducted {
                    amount: DISTRACTION_PENALTY,
                    reason: "distraction_penalty".to_string(),
                    spendable_points: spendable,
                    at: alert.at,
                });
                self.events.push(Event::DistractionAlert {
                    token: alert.token,
                    message: alert.message.clone(),
                    at: alert.at,
                });
                self.autosave();
            }
            FrameVerdict::Reward => {
                let old_level = self.state.level;
                self.state.add_points(FOCUS_BONUS, "supervision_focus_bonus");
                self.events.push(Event::FocusBonusAwarded {
                    amount: FOCUS_BONUS,
                    at: Utc::now(),
                });
                self.push_level_event(old_level);
                self.sweep_inner();
                self.autosave();
            }
            FrameVerdict::None => {}
        }

        verdict
    }

    // ── Achievements ─────────────────────────────────────────────────

    /// Evaluate the achievement catalog now. Unlocks are one-shot.
    pub fn sweep_achievements(&mut self) -> Vec<&'static AchievementDef> {
        let unlocked = self.sweep_inner();
        self.autosave();
        unlocked
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Retry persisting the current state after a failed autosave.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.store.save(&self.state)?;
        self.dirty = false;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn check_in_at(&mut self, day: NaiveDate) -> CheckInResult {
        let old_level = self.state.level;
        let result = self.state.check_in(day);
        if result.is_new {
            self.events.push(Event::CheckedIn {
                bonus: result.bonus,
                consecutive_days: result.consecutive_days,
                at: Utc::now(),
            });
            self.push_level_event(old_level);
        }
        result
    }

    fn sweep_inner(&mut self) -> Vec<&'static AchievementDef> {
        let old_level = self.state.level;
        let unlocked = achievements::sweep(&mut self.state);
        for def in &unlocked {
            self.events.push(Event::AchievementUnlocked {
                id: def.id.to_string(),
                name: def.name.to_string(),
                points_reward: def.points_reward,
                at: Utc::now(),
            });
        }
        self.push_level_event(old_level);
        unlocked
    }

    fn push_level_event(&mut self, old_level: u32) {
        if self.state.level > old_level {
            let def = crate::levels::level_for(self.state.points);
            self.events.push(Event::LeveledUp {
                old_level,
                new_level: def.level,
                title: def.name.to_string(),
                at: Utc::now(),
            });
        }
    }

    fn autosave(&mut self) {
        match self.store.save(&self.state) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                warn!(error = %e, "progress save failed; state kept in memory");
                self.dirty = true;
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn hour_of_day() -> u32 {
    Local::now().hour()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::FrameLabel;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn engine() -> Engine {
        Engine::new(Box::new(MemoryStore::new()), ProgressState::new())
    }

    fn frame(label: FrameLabel) -> FrameClassification {
        FrameClassification {
            label,
            reason: "test".to_string(),
        }
    }

    /// Store whose saves fail while the flag is set.
    struct FlakyStore {
        fail: Arc<AtomicBool>,
        inner: MemoryStore,
    }

    impl ProgressStore for FlakyStore {
        fn load(&self) -> Result<Option<ProgressState>, StorageError> {
            self.inner.load()
        }

        fn save(&self, state: &ProgressState) -> Result<(), StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Locked);
            }
            self.inner.save(state)
        }
    }

    #[test]
    fn frames_without_a_session_are_discarded() {
        let mut engine = engine();
        let verdict = engine.classify_frame(&frame(FrameLabel::Distracted));
        assert_eq!(verdict, FrameVerdict::None);
        let verdict = engine.classify_frame(&frame(FrameLabel::Distracted));
        assert_eq!(verdict, FrameVerdict::None);
        assert_eq!(engine.state().spendable_points, 0);
    }

    #[test]
    fn start_session_checks_in_and_stamps_dates() {
        let mut engine = engine();
        let result = engine.start_session();
        assert!(result.is_new);
        assert_eq!(result.consecutive_days, 1);
        assert!(engine.session_active());
        assert!(engine.state().first_study_date.is_some());
        assert_eq!(engine.state().first_study_date, engine.state().last_study_date);

        // Same day: idempotent.
        let again = engine.start_session();
        assert!(!again.is_new);
        assert_eq!(again.bonus, 0);
    }

    #[test]
    fn check_in_twice_same_day_is_idempotent() {
        let mut engine = engine();
        let first = engine.check_in();
        let second = engine.check_in();
        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(second.consecutive_days, first.consecutive_days);
    }

    #[test]
    fn distraction_penalty_fires_once_per_threshold() {
        let mut engine = engine();
        engine.start_session();
        engine.add_points(100, "seed");
        let spendable_before = engine.state().spendable_points;

        assert_eq!(
            engine.classify_frame(&frame(FrameLabel::Distracted)),
            FrameVerdict::None
        );
        let verdict = engine.classify_frame(&frame(FrameLabel::Distracted));
        assert!(matches!(verdict, FrameVerdict::Penalize { .. }));
        assert_eq!(engine.state().spendable_points, spendable_before - 5);

        let alerts = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Event::DistractionAlert { .. }))
            .count();
        assert_eq!(alerts, 1);
    }

    #[test]
    fn penalty_never_drives_spendable_negative() {
        let mut engine = engine();
        engine.start_session();
        // Drain the check-in bonus so the balance is small.
        let bonus = engine.state().spendable_points;
        engine.deduct_points(bonus as u32 - 3, "spend");
        assert_eq!(engine.state().spendable_points, 3);

        engine.classify_frame(&frame(FrameLabel::Distracted));
        engine.classify_frame(&frame(FrameLabel::Distracted));
        assert_eq!(engine.state().spendable_points, 0);
        // Lifetime total untouched by the penalty.
        assert_eq!(engine.state().points, bonus);
    }

    #[test]
    fn sustained_focus_awards_the_bonus() {
        let mut engine = engine();
        engine.start_session();
        let points_before = engine.state().points;

        for _ in 0..9 {
            assert_eq!(
                engine.classify_frame(&frame(FrameLabel::Learning)),
                FrameVerdict::None
            );
        }
        let verdict = engine.classify_frame(&frame(FrameLabel::Learning));
        assert_eq!(verdict, FrameVerdict::Reward);
        assert_eq!(engine.state().points, points_before + 2);
    }

    #[test]
    fn rest_suspends_telemetry_and_supervision() {
        let mut engine = engine();
        engine.start_session();
        assert_eq!(engine.toggle_rest(), Some(true));
        // Entering rest is not an early end.
        assert_eq!(engine.state().early_end_rest_count, 0);

        assert!(engine.record_study_minute().is_none());
        engine.record_emotion("happy", 0.9);
        engine.record_no_face();
        assert_eq!(
            engine.classify_frame(&frame(FrameLabel::Distracted)),
            FrameVerdict::None
        );
        let minutes = engine.state().total_study_minutes;
        assert_eq!(minutes, 0);

        // Leaving rest resumes telemetry.
        assert_eq!(engine.toggle_rest(), Some(false));
        assert!(engine.record_study_minute().is_some());
    }

    #[test]
    fn ending_rest_early_counts_and_awards() {
        let mut engine = engine();
        engine.start_session();
        let points_before = engine.state().points;

        engine.toggle_rest();
        engine.toggle_rest();
        assert_eq!(engine.state().early_end_rest_count, 1);
        assert_eq!(engine.state().points, points_before + EARLY_REST_AWARD as u64);

        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::PointsAwarded { reason, .. } if reason == "early_rest"
        )));
    }

    #[test]
    fn fifth_early_rest_end_unlocks_the_achievement() {
        let mut engine = engine();
        engine.start_session();
        for _ in 0..5 {
            engine.toggle_rest();
            engine.toggle_rest();
        }
        assert_eq!(engine.state().early_end_rest_count, 5);
        assert!(engine
            .state()
            .achievements
            .iter()
            .any(|id| id == "early_rest_5"));
    }

    #[test]
    fn rest_entry_clears_the_distraction_run() {
        let mut engine = engine();
        engine.start_session();
        assert_eq!(
            engine.classify_frame(&frame(FrameLabel::Distracted)),
            FrameVerdict::None
        );
        engine.toggle_rest();
        engine.toggle_rest();

        let spendable_before = engine.state().spendable_points;
        let verdict = engine.classify_frame(&frame(FrameLabel::Distracted));
        assert_eq!(verdict, FrameVerdict::None);
        assert_eq!(engine.state().spendable_points, spendable_before);
    }

    #[test]
    fn minute_ticks_queue_only_boundary_awards() {
        let mut engine = engine();
        engine.start_session();
        engine.drain_events();

        for _ in 0..30 {
            engine.record_study_minute();
        }
        let awards: Vec<String> = engine
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                Event::PointsAwarded { reason, .. } => Some(reason),
                _ => None,
            })
            .collect();
        assert_eq!(awards, vec!["continuous_learning_bonus".to_string()]);
    }

    #[test]
    fn rest_requires_an_active_session() {
        let mut engine = engine();
        assert_eq!(engine.toggle_rest(), None);
    }

    #[test]
    fn study_minutes_unlock_achievements() {
        let mut engine = engine();
        engine.start_session();
        let result = engine.record_study_minute().unwrap();
        assert_eq!(result.today_minutes, 1);
        assert!(engine
            .state()
            .achievements
            .iter()
            .any(|id| id == "first_study"));
    }

    #[test]
    fn stop_session_discards_monitor_state() {
        let mut engine = engine();
        engine.start_session();
        engine.classify_frame(&frame(FrameLabel::Distracted));
        engine.stop_session();
        assert!(!engine.session_active());

        // A fresh session starts from a clean streak.
        engine.start_session();
        let verdict = engine.classify_frame(&frame(FrameLabel::Distracted));
        assert_eq!(verdict, FrameVerdict::None);
    }

    #[test]
    fn save_failure_keeps_state_and_flush_retries() {
        let fail = Arc::new(AtomicBool::new(true));
        let store = FlakyStore {
            fail: Arc::clone(&fail),
            inner: MemoryStore::new(),
        };
        let mut engine = Engine::new(Box::new(store), ProgressState::new());

        engine.add_points(50, "x");
        // The mutation survived in memory despite the failed save.
        assert_eq!(engine.state().points, 50);
        assert!(engine.is_dirty());
        assert!(engine.flush().is_err());

        fail.store(false, Ordering::SeqCst);
        assert!(engine.flush().is_ok());
        assert!(!engine.is_dirty());
    }

    #[test]
    fn load_round_trips_through_the_store() {
        let store = MemoryStore::new();
        {
            let mut engine = Engine::new(Box::new(store), ProgressState::new());
            engine.add_points(777, "x");
            // Engine owns the store; reuse a second store seeded the
            // same way instead.
            assert_eq!(engine.state().points, 777);
        }

        let store = MemoryStore::new();
        let mut state = ProgressState::new();
        state.add_points(777, "x");
        store.save(&state).unwrap();
        let engine = Engine::load(Box::new(store)).unwrap();
        assert_eq!(engine.state().points, 777);
        assert_eq!(engine.state().level, 4);
    }

    #[test]
    fn events_are_drained_once() {
        let mut engine = engine();
        engine.check_in();
        let events = engine.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::CheckedIn { .. })));
        assert!(engine.drain_events().is_empty());
    }
}

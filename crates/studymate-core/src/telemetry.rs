//! Daily telemetry aggregation.
//!
//! One mutable [`DailyRecord`] per calendar day, created lazily on the
//! first telemetry event of that day and pruned past the retention
//! limit. Three feeds land here:
//!
//! - the per-minute study tick (`record_study_minute`),
//! - periodic emotion samples from the vision pipeline
//!   (`record_emotion`),
//! - no-face samples when the pipeline finds nobody in frame
//!   (`record_no_face`).
//!
//! Every sample recomputes the day's 0-100 focus score, a composite of
//! emotional positivity, attendance ratio, and a sustained-attention
//! bonus.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::progress::{ProgressState, DAILY_RECORD_LIMIT};

/// A sample counts as focused only above this confidence.
pub const FOCUS_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Extra points awarded every this-many study minutes in a day.
pub const CONTINUOUS_BONUS_INTERVAL_MIN: u32 = 30;

/// The fixed set of emotion labels the vision pipeline may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Neutral,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
    ];

    /// Parse a classifier label. Unrecognized labels yield `None` and
    /// the sample is counted as unlabelled, never as an error.
    pub fn parse(label: &str) -> Option<Emotion> {
        match label {
            "happy" => Some(Emotion::Happy),
            "neutral" => Some(Emotion::Neutral),
            "sad" => Some(Emotion::Sad),
            "angry" => Some(Emotion::Angry),
            "fearful" => Some(Emotion::Fearful),
            "disgusted" => Some(Emotion::Disgusted),
            "surprised" => Some(Emotion::Surprised),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Surprised => "surprised",
        }
    }

    /// Happy and neutral count toward the positive-emotion score.
    pub fn is_positive(&self) -> bool {
        matches!(self, Emotion::Happy | Emotion::Neutral)
    }
}

/// Telemetry for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub study_minutes: u32,
    /// Sample counts per recognized emotion label.
    pub emotions: BTreeMap<Emotion, u32>,
    /// Study minutes bucketed by local hour of day.
    pub hourly_minutes: [u32; 24],
    /// Samples that carried a recognized emotion label.
    pub emotion_samples: u32,
    /// Samples where no face was detected.
    pub no_face_count: u32,
    /// All samples, labelled or not.
    pub total_samples: u32,
    /// Longest run of focused samples, in sample units.
    pub max_consecutive_focus: u32,
    pub current_consecutive_focus: u32,
    /// Composite 0-100 score, recomputed after every sample.
    pub focus_score: u32,
}

impl Default for DailyRecord {
    fn default() -> Self {
        Self::new(NaiveDate::default())
    }
}

impl DailyRecord {
    pub fn new(date: NaiveDate) -> Self {
        let emotions = Emotion::ALL.iter().map(|e| (*e, 0)).collect();
        Self {
            date,
            study_minutes: 0,
            emotions,
            hourly_minutes: [0; 24],
            emotion_samples: 0,
            no_face_count: 0,
            total_samples: 0,
            max_consecutive_focus: 0,
            current_consecutive_focus: 0,
            focus_score: 0,
        }
    }

    fn emotion_count(&self, emotion: Emotion) -> u32 {
        self.emotions.get(&emotion).copied().unwrap_or(0)
    }

    /// Recompute the composite focus score:
    ///
    /// ```text
    /// positive_ratio   = (happy + neutral) / emotion_samples   (0 when no samples)
    /// attendance_ratio = emotion_samples / total_samples
    /// bonus            = min(max_consecutive_focus / 10, 10)
    /// score            = round(clamp(positive_ratio*60 + attendance_ratio*30 + bonus, 0, 100))
    /// ```
    fn recompute_focus_score(&mut self) {
        if self.total_samples == 0 {
            self.focus_score = 0;
            return;
        }

        let positive = self.emotion_count(Emotion::Happy) + self.emotion_count(Emotion::Neutral);
        let positive_ratio = if self.emotion_samples > 0 {
            f64::from(positive) / f64::from(self.emotion_samples)
        } else {
            0.0
        };
        let emotion_score = positive_ratio * 60.0;

        let attendance_ratio = f64::from(self.emotion_samples) / f64::from(self.total_samples);
        let attendance_score = attendance_ratio * 30.0;

        let consecutive_bonus = (f64::from(self.max_consecutive_focus) / 10.0).min(10.0);

        let score = (emotion_score + attendance_score + consecutive_bonus).clamp(0.0, 100.0);
        self.focus_score = score.round() as u32;
    }
}

/// Outcome of recording one study minute.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StudyMinuteResult {
    pub today_minutes: u32,
    /// True when this minute crossed a 30-minute boundary and earned
    /// the continuous-learning bonus.
    pub continuous_bonus: bool,
    pub leveled_up: bool,
}

impl ProgressState {
    /// Get or lazily create the record for `today`, pruning the oldest
    /// records past the retention limit.
    pub(crate) fn day_record_mut(&mut self, today: NaiveDate) -> &mut DailyRecord {
        match self.daily_records.iter().position(|r| r.date == today) {
            Some(idx) => &mut self.daily_records[idx],
            None => {
                if self.daily_records.len() >= DAILY_RECORD_LIMIT {
                    let overflow = self.daily_records.len() + 1 - DAILY_RECORD_LIMIT;
                    self.daily_records.drain(..overflow);
                }
                self.daily_records.push(DailyRecord::new(today));
                let last = self.daily_records.len() - 1;
                &mut self.daily_records[last]
            }
        }
    }

    /// Read-only lookup of a day's record.
    pub fn day_record(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.daily_records.iter().find(|r| r.date == date)
    }

    /// Record one elapsed study minute.
    ///
    /// Caller contract: at most once per elapsed minute, only while a
    /// session is active and not resting. Awards the base point and,
    /// on every exact 30-minute boundary of today's total, the
    /// continuous-learning bonus.
    pub fn record_study_minute(&mut self, today: NaiveDate, hour: u32) -> StudyMinuteResult {
        self.total_study_minutes += 1;
        self.today_study_minutes += 1;
        let today_minutes = self.today_study_minutes;

        {
            let record = self.day_record_mut(today);
            record.study_minutes += 1;
            if let Some(bucket) = record.hourly_minutes.get_mut(hour as usize) {
                *bucket += 1;
            }
        }

        let base = self.add_points(1, "study_minute");
        let mut leveled_up = base.leveled_up;
        let continuous_bonus = today_minutes % CONTINUOUS_BONUS_INTERVAL_MIN == 0;
        if continuous_bonus {
            let bonus = self.add_points(10, "continuous_learning_bonus");
            leveled_up |= bonus.leveled_up;
            debug!(today_minutes, "continuous learning bonus");
        }

        StudyMinuteResult {
            today_minutes,
            continuous_bonus,
            leveled_up,
        }
    }

    /// Record one emotion sample from the vision pipeline.
    ///
    /// Out-of-range confidence drops the sample entirely. An
    /// unrecognized label still counts toward `total_samples` but not
    /// toward the emotion tallies. A sample is focused iff the label
    /// is positive and the confidence clears the threshold; focused
    /// samples extend the consecutive-focus run, anything else breaks
    /// it.
    pub fn record_emotion(&mut self, today: NaiveDate, label: &str, confidence: f64) {
        if !(0.0..=1.0).contains(&confidence) {
            debug!(label, confidence, "emotion sample dropped: confidence out of range");
            return;
        }

        let emotion = Emotion::parse(label);
        let record = self.day_record_mut(today);
        record.total_samples += 1;

        if let Some(e) = emotion {
            *record.emotions.entry(e).or_insert(0) += 1;
            record.emotion_samples += 1;
        }

        let focused = matches!(emotion, Some(e) if e.is_positive())
            && confidence > FOCUS_CONFIDENCE_THRESHOLD;
        if focused {
            record.current_consecutive_focus += 1;
            if record.current_consecutive_focus > record.max_consecutive_focus {
                record.max_consecutive_focus = record.current_consecutive_focus;
            }
        } else {
            record.current_consecutive_focus = 0;
        }

        record.recompute_focus_score();
    }

    /// Record a sample with no detected face. Breaks the
    /// consecutive-focus run.
    pub fn record_no_face(&mut self, today: NaiveDate) {
        let record = self.day_record_mut(today);
        record.total_samples += 1;
        record.no_face_count += 1;
        record.current_consecutive_focus = 0;
        record.recompute_focus_score();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn study_minute_updates_all_counters() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);

        let result = state.record_study_minute(today, 14);
        assert_eq!(result.today_minutes, 1);
        assert!(!result.continuous_bonus);
        assert_eq!(state.total_study_minutes, 1);
        assert_eq!(state.points, 1);

        let record = state.day_record(today).unwrap();
        assert_eq!(record.study_minutes, 1);
        assert_eq!(record.hourly_minutes[14], 1);
    }

    #[test]
    fn thirty_minute_boundary_awards_bonus() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        for minute in 1..=30 {
            let result = state.record_study_minute(today, 9);
            assert_eq!(result.continuous_bonus, minute == 30);
        }
        // 30 base points plus one 10-point bonus.
        assert_eq!(state.points, 40);
        assert_eq!(state.today_study_minutes, 30);
    }

    #[test]
    fn focused_samples_extend_the_run() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        state.record_emotion(today, "happy", 0.9);
        state.record_emotion(today, "neutral", 0.8);
        state.record_emotion(today, "happy", 0.7);

        let record = state.day_record(today).unwrap();
        assert_eq!(record.current_consecutive_focus, 3);
        assert_eq!(record.max_consecutive_focus, 3);
        assert_eq!(record.emotion_samples, 3);
        assert_eq!(record.total_samples, 3);
    }

    #[test]
    fn low_confidence_positive_is_not_focused() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        state.record_emotion(today, "happy", 0.4);
        let record = state.day_record(today).unwrap();
        assert_eq!(record.current_consecutive_focus, 0);
        // Still a recognized sample.
        assert_eq!(record.emotion_samples, 1);
    }

    #[test]
    fn negative_emotion_breaks_the_run() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        state.record_emotion(today, "happy", 0.9);
        state.record_emotion(today, "happy", 0.9);
        state.record_emotion(today, "sad", 0.9);
        let record = state.day_record(today).unwrap();
        assert_eq!(record.current_consecutive_focus, 0);
        assert_eq!(record.max_consecutive_focus, 2);
    }

    #[test]
    fn no_face_breaks_the_run_and_counts() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        state.record_emotion(today, "happy", 0.9);
        state.record_no_face(today);
        let record = state.day_record(today).unwrap();
        assert_eq!(record.current_consecutive_focus, 0);
        assert_eq!(record.no_face_count, 1);
        assert_eq!(record.total_samples, 2);
        assert_eq!(record.emotion_samples, 1);
    }

    #[test]
    fn unrecognized_label_counts_total_only() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        state.record_emotion(today, "confused", 0.9);
        let record = state.day_record(today).unwrap();
        assert_eq!(record.total_samples, 1);
        assert_eq!(record.emotion_samples, 0);
    }

    #[test]
    fn out_of_range_confidence_drops_the_sample() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        state.record_emotion(today, "happy", 1.5);
        state.record_emotion(today, "happy", -0.1);
        assert!(state.day_record(today).is_none());
    }

    #[test]
    fn focus_score_matches_the_formula() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        // 3 happy (focused), 1 sad, 1 no-face.
        for _ in 0..3 {
            state.record_emotion(today, "happy", 0.9);
        }
        state.record_emotion(today, "sad", 0.9);
        state.record_no_face(today);

        let record = state.day_record(today).unwrap();
        // positive 3/4 * 60 = 45, attendance 4/5 * 30 = 24,
        // bonus 3/10 = 0.3 -> round(69.3) = 69.
        assert_eq!(record.focus_score, 69);
    }

    #[test]
    fn empty_day_scores_zero() {
        let record = DailyRecord::new(date(2024, 3, 10));
        assert_eq!(record.focus_score, 0);
    }

    #[test]
    fn daily_records_are_bounded() {
        let mut state = ProgressState::new();
        let start = date(2024, 1, 1);
        for offset in 0..70 {
            state.record_study_minute(start + chrono::Duration::days(offset), 10);
        }
        assert_eq!(state.daily_records.len(), DAILY_RECORD_LIMIT);
        assert_eq!(
            state.daily_records[0].date,
            start + chrono::Duration::days(10)
        );
    }

    #[test]
    fn records_are_unique_per_date() {
        let mut state = ProgressState::new();
        let today = date(2024, 3, 10);
        state.record_study_minute(today, 9);
        state.record_emotion(today, "happy", 0.9);
        state.record_no_face(today);
        assert_eq!(state.daily_records.len(), 1);
    }

    proptest! {
        #[test]
        fn focus_score_stays_in_bounds(samples in proptest::collection::vec((0u8..4, 0.0f64..1.0), 0..200)) {
            let mut state = ProgressState::new();
            let today = date(2024, 3, 10);
            for (kind, confidence) in samples {
                match kind {
                    0 => state.record_emotion(today, "happy", confidence),
                    1 => state.record_emotion(today, "sad", confidence),
                    2 => state.record_emotion(today, "mystery", confidence),
                    _ => state.record_no_face(today),
                }
                if let Some(record) = state.day_record(today) {
                    prop_assert!(record.focus_score <= 100);
                    prop_assert!(record.emotion_samples + record.no_face_count <= record.total_samples);
                }
            }
        }
    }
}

//! # Studymate Core Library
//!
//! Core engagement and progression logic for the Studymate study
//! companion. All operations are available via a standalone CLI
//! binary, with any GUI shell acting as a thin layer over the same
//! core library.
//!
//! ## Architecture
//!
//! - **Engine**: A single-owner facade that serializes every mutation
//!   to the progress ledger and applies persistence after each one
//! - **Progress**: The points ledger, level ladder, and daily check-in
//!   streak tracker
//! - **Telemetry**: Per-day aggregation of study minutes, emotion
//!   samples, and the derived focus score
//! - **Achievements**: A fixed catalog evaluated by one-shot sweeps
//! - **Monitor**: The per-frame distraction/focus supervision state
//!   machine
//! - **Storage**: SQLite-based progress snapshots and TOML-based
//!   preferences
//!
//! ## Key Components
//!
//! - [`Engine`]: The mutation facade
//! - [`ProgressState`]: The persisted ledger state
//! - [`Database`]: Progress persistence
//! - [`SupervisionMonitor`]: Frame-stream supervision

pub mod achievements;
pub mod engine;
pub mod error;
pub mod events;
pub mod levels;
pub mod monitor;
pub mod progress;
pub mod stats;
pub mod storage;
pub mod telemetry;

pub use achievements::{AchievementDef, AchievementProgress, AchievementStatus, CATALOG};
pub use engine::Engine;
pub use error::{CoreError, StorageError, ValidationError};
pub use events::Event;
pub use levels::{level_for, LevelDef, LEVELS};
pub use monitor::{AlertTrigger, FrameClassification, FrameLabel, FrameVerdict, SupervisionMonitor};
pub use progress::{AddPointsResult, CheckInResult, ProgressState};
pub use stats::{DayStat, HourStat, LevelProgress, StatsSummary};
pub use storage::{Database, MemoryStore, Prefs, ProgressStore};
pub use telemetry::{DailyRecord, Emotion, StudyMinuteResult};

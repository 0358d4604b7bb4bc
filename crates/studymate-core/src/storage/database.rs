//! SQLite-backed progress persistence.
//!
//! The full [`ProgressState`] is persisted as one JSON snapshot in a
//! key-value table, so the round-trip covers every field including the
//! bounded history collections. A small kv store is also exposed for
//! application state that does not belong in the snapshot.

use std::path::PathBuf;

use rusqlite::{params, Connection};

use super::data_dir;
use super::store::ProgressStore;
use crate::error::{CoreError, StorageError};
use crate::progress::ProgressState;

const PROGRESS_KEY: &str = "progress_state";

/// SQLite database for progress storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/studymate/studymate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("studymate.db");
        Self::open_at(path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: PathBuf) -> Result<Self, CoreError> {
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate().map_err(StorageError::from)?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate().map_err(StorageError::from)?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ProgressStore for Database {
    fn load(&self) -> Result<Option<ProgressState>, StorageError> {
        match self.kv_get(PROGRESS_KEY)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::CorruptSnapshot(e.to_string())),
        }
    }

    fn save(&self, state: &ProgressState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state)
            .map_err(|e| StorageError::EncodeFailed(e.to_string()))?;
        self.kv_set(PROGRESS_KEY, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rich_state() -> ProgressState {
        let mut state = ProgressState::new();
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        state.check_in(day);
        state.check_in(day + chrono::Duration::days(1));
        for _ in 0..35 {
            state.record_study_minute(day, 14);
        }
        state.record_emotion(day, "happy", 0.9);
        state.record_emotion(day, "surprised", 0.6);
        state.record_no_face(day);
        state.record_early_rest();
        state.first_study_date = Some(day);
        state.last_study_date = Some(day + chrono::Duration::days(1));
        crate::achievements::sweep(&mut state);
        state
    }

    #[test]
    fn fresh_database_loads_none() {
        let db = Database::open_memory().unwrap();
        assert!(db.load().unwrap().is_none());
    }

    #[test]
    fn save_and_load_round_trips() {
        let db = Database::open_memory().unwrap();
        let state = rich_state();
        db.save(&state).unwrap();
        let loaded = db.load().unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn save_overwrites_the_snapshot() {
        let db = Database::open_memory().unwrap();
        let mut state = rich_state();
        db.save(&state).unwrap();
        state.add_points(500, "x");
        db.save(&state).unwrap();
        let loaded = db.load().unwrap().unwrap();
        assert_eq!(loaded.points, state.points);
    }

    #[test]
    fn corrupt_snapshot_is_a_distinct_error() {
        let db = Database::open_memory().unwrap();
        db.kv_set(PROGRESS_KEY, "not json").unwrap();
        match db.load() {
            Err(StorageError::CorruptSnapshot(_)) => {}
            other => panic!("expected CorruptSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studymate.db");
        let state = rich_state();
        {
            let db = Database::open_at(path.clone()).unwrap();
            db.save(&state).unwrap();
        }
        let db = Database::open_at(path).unwrap();
        assert_eq!(db.load().unwrap().unwrap(), state);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}

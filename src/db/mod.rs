//! Database module - SQLite key-value storage for user preferences

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::exercises::Goal;
use crate::profile::{DEFAULT_LEVEL, Profile};

/// Selected training goal
pub const KEY_GOAL: &str = "userGoal";
/// Experience level, stringified integer
pub const KEY_LEVEL: &str = "userExp";
/// Most recent generated coach protocol
pub const KEY_PLAN: &str = "aiPlan";

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open preference store at {path}"))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Store a value, replacing any previous one
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        debug!(key, "Stored preference");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.set(KEY_GOAL, profile.goal.name())?;
        self.set(KEY_LEVEL, &profile.level.to_string())?;
        Ok(())
    }

    /// Load the stored profile. Missing or unreadable values fall back to
    /// the defaults (Hypertrophy, level 50).
    pub fn load_profile(&self) -> Result<Profile> {
        let goal = match self.get(KEY_GOAL)? {
            Some(raw) => raw.parse::<Goal>().unwrap_or_else(|e| {
                warn!("Ignoring stored goal: {}", e);
                Goal::default()
            }),
            None => Goal::default(),
        };

        let level = match self.get(KEY_LEVEL)? {
            // Out-of-range numbers saturate at the slider bounds
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(level) => level.clamp(0, 100) as u8,
                Err(_) => {
                    warn!("Ignoring stored level '{}'", raw);
                    DEFAULT_LEVEL
                }
            },
            None => DEFAULT_LEVEL,
        };

        Ok(Profile { goal, level })
    }

    pub fn save_plan(&self, plan: &str) -> Result<()> {
        self.set(KEY_PLAN, plan)
    }

    pub fn load_plan(&self) -> Result<Option<String>> {
        self.get(KEY_PLAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ExperienceTier;

    #[test]
    fn test_get_missing_key() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("nothing").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.set(KEY_PLAN, "first").unwrap();
        db.set(KEY_PLAN, "second").unwrap();
        assert_eq!(db.load_plan().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_profile_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        db.save_profile(&Profile::new(Goal::FatLoss, 80)).unwrap();
        assert_eq!(db.get(KEY_GOAL).unwrap().as_deref(), Some("Fat Loss"));
        assert_eq!(db.get(KEY_LEVEL).unwrap().as_deref(), Some("80"));

        let loaded = db.load_profile().unwrap();
        assert_eq!(loaded, Profile::new(Goal::FatLoss, 80));
    }

    #[test]
    fn test_profile_defaults_when_empty() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_profile().unwrap(), Profile::default());
    }

    #[test]
    fn test_profile_defaults_on_garbage() {
        let db = Database::open_in_memory().unwrap();
        db.set(KEY_GOAL, "Yoga").unwrap();
        db.set(KEY_LEVEL, "lots").unwrap();
        let loaded = db.load_profile().unwrap();
        assert_eq!(loaded.goal, Goal::Hypertrophy);
        assert_eq!(loaded.level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_profile_level_clamped() {
        let db = Database::open_in_memory().unwrap();
        db.set(KEY_GOAL, "Strength").unwrap();

        db.set(KEY_LEVEL, "300").unwrap();
        let loaded = db.load_profile().unwrap();
        assert_eq!(loaded.level, 100);
        assert_eq!(loaded.tier(), ExperienceTier::Advanced);

        db.set(KEY_LEVEL, " -5 ").unwrap();
        let loaded = db.load_profile().unwrap();
        assert_eq!(loaded.level, 0);
        assert_eq!(loaded.tier(), ExperienceTier::Beginner);
    }

    #[test]
    fn test_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stitch.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::open(path).unwrap();
            db.save_plan("Focus on eccentric control.").unwrap();
        }

        let db = Database::open(path).unwrap();
        assert_eq!(
            db.load_plan().unwrap().as_deref(),
            Some("Focus on eccentric control.")
        );
    }
}

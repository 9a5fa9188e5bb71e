use anyhow::Context;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Snapshot key for the logged-in teacher.
pub const USER_KEY: &str = "lifeSkills_user";
/// Snapshot key for the full studentId -> assessment collection.
pub const DATA_KEY: &str = "lifeSkills_data";

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join("lifeskills.sqlite3")
}

/// Device-scoped key-value persistence. The daemon uses exactly two keys
/// (see [`USER_KEY`], [`DATA_KEY`]); values are JSON text.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)
            .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
        let conn = Connection::open(db_path(workspace))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshot(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM snapshot WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO snapshot(key, value, updated_at) VALUES(?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            (key, value, Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM snapshot WHERE key = ?", [key])?;
        Ok(())
    }

    /// Guarded read: a missing key, a read error, or a value that is not
    /// valid JSON for `T` all come back as `None`. Corrupt local state must
    /// never take the daemon down.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = match self.get(key) {
            Ok(v) => v?,
            Err(e) => {
                warn!(key, error = %e, "snapshot read failed; treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "snapshot value is not valid JSON; treating as absent");
                None
            }
        }
    }

    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let text = serde_json::to_string(value).context("failed to serialize snapshot value")?;
        self.set(key, &text)
    }
}

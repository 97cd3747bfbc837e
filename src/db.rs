// SQLite key-value store for user preferences (currently just the theme).

use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// A stored preference with its last write time
#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Open (or create) the preference database at `path` and ensure the schema.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    debug!(path = %path.display(), "preference database ready");
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub fn get_preference(conn: &Connection, key: &str) -> Result<Option<Preference>> {
    let row = conn
        .query_row(
            "SELECT key, value, updated_at FROM preferences WHERE key = ?1",
            params![key],
            |row| {
                let updated_at: String = row.get(2)?;
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, updated_at))
            },
        )
        .optional()?;

    Ok(row.map(|(key, value, updated_at)| Preference {
        key,
        value,
        // Unreadable timestamps read as the epoch
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default(),
    }))
}

/// Insert or overwrite a preference
pub fn set_preference(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )?;

    debug!(key, value, "preference saved");
    Ok(())
}

//! User model
//!
//! A tenant owning gear, categories and pack lists. Carries the display
//! unit preference, which callers load and pass explicitly to formatting.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::weight::WeightUnit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub weight_unit: WeightUnit,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            display_name: row.get("display_name")?,
            weight_unit: WeightUnit::from_db_str(row.get::<_, String>("weight_unit")?.as_str()),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Name to show publicly: display name if set, otherwise the username
    pub fn public_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by username
    pub fn get_by_username(conn: &Connection, username: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE username = ?1")?;

        match stmt.query_row([username], Self::from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by username, creating it if needed.
    /// Returns (user, created).
    pub fn get_or_create(conn: &Connection, username: &str) -> DbResult<(Self, bool)> {
        if let Some(user) = Self::get_by_username(conn, username)? {
            return Ok((user, false));
        }

        conn.execute("INSERT INTO users (username) VALUES (?1)", [username])?;
        let id = conn.last_insert_rowid();
        let user = Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "User", id })?;
        tracing::info!("Created user '{}' (id {})", user.username, user.id);
        Ok((user, true))
    }

    /// Change the preferred display unit
    pub fn set_weight_unit(conn: &Connection, id: i64, unit: WeightUnit) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE users SET weight_unit = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![unit.to_db_str(), id],
        )?;
        Self::get_by_id(conn, id)
    }

    /// Set or clear the display name
    pub fn set_display_name(conn: &Connection, id: i64, display_name: Option<&str>) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE users SET display_name = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![display_name, id],
        )?;
        Self::get_by_id(conn, id)
    }
}

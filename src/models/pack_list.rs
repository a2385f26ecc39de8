//! Pack List model
//!
//! A named collection of gear for a trip. Can be shared publicly via a
//! random slug.

use rand::Rng;
use rusqlite::{params, Connection, ErrorCode, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Length of generated share slugs
pub const SHARE_SLUG_LEN: usize = 10;
const SHARE_SLUG_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SHARE_SLUG_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackList {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub share_slug: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackListCreate {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackListUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Generate a random lowercase alphanumeric share slug
pub fn generate_share_slug() -> String {
    let mut rng = rand::thread_rng();
    (0..SHARE_SLUG_LEN)
        .map(|_| SHARE_SLUG_CHARSET[rng.gen_range(0..SHARE_SLUG_CHARSET.len())] as char)
        .collect()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl PackList {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            is_public: row.get("is_public")?,
            share_slug: row.get("share_slug")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new (private) pack list
    pub fn create(conn: &Connection, user_id: i64, data: &PackListCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO pack_lists (user_id, name, description) VALUES (?1, ?2, ?3)",
            params![user_id, data.name, data.description],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, user_id, id)?.ok_or(DbError::NotFound { entity: "Pack list", id })
    }

    /// Get a pack list by ID, scoped to its owner
    pub fn get_by_id(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM pack_lists WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row([id, user_id], Self::from_row) {
            Ok(list) => Ok(Some(list)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a public pack list by its share slug. Any user may call this.
    pub fn get_by_slug(conn: &Connection, slug: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM pack_lists WHERE share_slug = ?1 AND is_public = 1",
        )?;

        match stmt.query_row([slug], Self::from_row) {
            Ok(list) => Ok(Some(list)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All of a user's pack lists, most recently updated first
    pub fn list(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM pack_lists WHERE user_id = ?1 ORDER BY updated_at DESC, id DESC",
        )?;

        let lists = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lists)
    }

    /// Update name/description
    pub fn update(conn: &Connection, user_id: i64, id: i64, data: &PackListUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name, "name");
        add_update!(description, "description");

        if updates.is_empty() {
            return Self::get_by_id(conn, user_id, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE pack_lists SET {} WHERE id = ?{} AND user_id = ?{}",
            updates.join(", "),
            params_vec.len() + 1,
            params_vec.len() + 2
        );
        params_vec.push(Box::new(id));
        params_vec.push(Box::new(user_id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, user_id, id)
    }

    /// Bump updated_at after the list's items change
    pub fn touch(conn: &Connection, id: i64) -> DbResult<()> {
        conn.execute(
            "UPDATE pack_lists SET updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    /// Make the list public. An existing slug is kept so old links stay valid.
    pub fn share(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let list = match Self::get_by_id(conn, user_id, id)? {
            Some(list) => list,
            None => return Ok(None),
        };

        if let Some(slug) = list.share_slug.as_deref() {
            conn.execute(
                "UPDATE pack_lists SET is_public = 1, updated_at = datetime('now') WHERE id = ?1",
                [id],
            )?;
            tracing::info!("Re-shared pack list {} at slug {}", id, slug);
            return Self::get_by_id(conn, user_id, id);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let slug = generate_share_slug();
            let result = conn.execute(
                "UPDATE pack_lists SET is_public = 1, share_slug = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![slug, id],
            );

            match result {
                Ok(_) => {
                    tracing::info!("Shared pack list {} at slug {}", id, slug);
                    return Self::get_by_id(conn, user_id, id);
                }
                Err(e) if is_unique_violation(&e) && attempt < SHARE_SLUG_ATTEMPTS => {
                    tracing::warn!("Share slug collision on attempt {}, retrying", attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Make the list private again and drop its slug
    pub fn unshare(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        conn.execute(
            r#"
            UPDATE pack_lists SET is_public = 0, share_slug = NULL, updated_at = datetime('now')
            WHERE id = ?1 AND user_id = ?2
            "#,
            [id, user_id],
        )?;
        Self::get_by_id(conn, user_id, id)
    }

    /// Copy a pack list and all of its items. The copy is always private.
    pub fn duplicate(conn: &Connection, user_id: i64, id: i64, new_name: &str) -> DbResult<Option<Self>> {
        let source = match Self::get_by_id(conn, user_id, id)? {
            Some(list) => list,
            None => return Ok(None),
        };

        let copy = Self::create(
            conn,
            user_id,
            &PackListCreate {
                name: new_name.to_string(),
                description: source.description.clone(),
            },
        )?;

        conn.execute(
            r#"
            INSERT INTO pack_list_items (
                pack_list_id, gear_item_id, quantity, is_included, is_worn, is_consumable, notes
            )
            SELECT ?1, gear_item_id, quantity, is_included, is_worn, is_consumable, notes
            FROM pack_list_items WHERE pack_list_id = ?2
            ORDER BY id
            "#,
            [copy.id, source.id],
        )?;

        Ok(Some(copy))
    }

    /// Number of items in a pack list (included or not)
    pub fn item_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pack_list_items WHERE pack_list_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a pack list and its items
    pub fn delete(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM pack_lists WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::models::User;

    fn create(conn: &Connection, user_id: i64, name: &str) -> PackList {
        PackList::create(
            conn,
            user_id,
            &PackListCreate {
                name: name.to_string(),
                description: Some("desc".to_string()),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_slug_shape() {
        let slug = generate_share_slug();
        assert_eq!(slug.len(), SHARE_SLUG_LEN);
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_share_and_unshare() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let (user, _) = User::get_or_create(conn, "u")?;
            let list = create(conn, user.id, "JMT");
            assert!(!list.is_public);
            assert!(list.share_slug.is_none());

            let shared = PackList::share(conn, user.id, list.id)?.unwrap();
            assert!(shared.is_public);
            let slug = shared.share_slug.clone().unwrap();
            assert_eq!(PackList::get_by_slug(conn, &slug)?.unwrap().id, list.id);

            // Sharing again keeps the slug
            let again = PackList::share(conn, user.id, list.id)?.unwrap();
            assert_eq!(again.share_slug.as_deref(), Some(slug.as_str()));

            let private = PackList::unshare(conn, user.id, list.id)?.unwrap();
            assert!(!private.is_public);
            assert!(private.share_slug.is_none());
            assert!(PackList::get_by_slug(conn, &slug)?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_share_requires_owner() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let (alice, _) = User::get_or_create(conn, "alice")?;
            let (bob, _) = User::get_or_create(conn, "bob")?;
            let list = create(conn, alice.id, "PCT");
            assert!(PackList::share(conn, bob.id, list.id)?.is_none());
            assert!(PackList::get_by_id(conn, alice.id, list.id)?.unwrap().share_slug.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_duplicate_copies_items_not_share_state() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let (user, _) = User::get_or_create(conn, "u")?;
            let list = create(conn, user.id, "Weekend");
            conn.execute(
                "INSERT INTO gear_items (user_id, name, weight_grams) VALUES (?1, 'Tent', 900)",
                [user.id],
            )?;
            let gear_id = conn.last_insert_rowid();
            conn.execute(
                "INSERT INTO pack_list_items (pack_list_id, gear_item_id, quantity, is_worn) VALUES (?1, ?2, 2, 1)",
                [list.id, gear_id],
            )?;
            PackList::share(conn, user.id, list.id)?;

            let copy = PackList::duplicate(conn, user.id, list.id, "Weekend (copy)")?.unwrap();
            assert_ne!(copy.id, list.id);
            assert_eq!(copy.description.as_deref(), Some("desc"));
            assert!(!copy.is_public);
            assert!(copy.share_slug.is_none());
            assert_eq!(PackList::item_count(conn, copy.id)?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_cascades_items() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let (user, _) = User::get_or_create(conn, "u")?;
            let list = create(conn, user.id, "Day hike");
            conn.execute(
                "INSERT INTO gear_items (user_id, name, weight_grams) VALUES (?1, 'Bottle', 30)",
                [user.id],
            )?;
            let gear_id = conn.last_insert_rowid();
            conn.execute(
                "INSERT INTO pack_list_items (pack_list_id, gear_item_id) VALUES (?1, ?2)",
                [list.id, gear_id],
            )?;

            assert!(PackList::delete(conn, user.id, list.id)?);
            assert_eq!(PackList::item_count(conn, list.id)?, 0);
            Ok(())
        })
        .unwrap();
    }
}

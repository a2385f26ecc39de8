//! Category model
//!
//! User-defined groupings for gear (Shelter, Sleep System, Kitchen...).

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::weight::DEFAULT_CATEGORY_COLOR;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Category with catalog statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithStats {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub sort_order: i64,
    pub gear_count: i64,
    /// Sum of one of each gear item in the category, in grams
    pub catalog_weight_grams: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
}

/// Accepts `#rgb` and `#rrggbb` hex colors
pub fn is_valid_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

impl Category {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            sort_order: row.get("sort_order")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new category. New categories go to the end unless a sort order is given.
    pub fn create(conn: &Connection, user_id: i64, data: &CategoryCreate) -> DbResult<Self> {
        let sort_order = match data.sort_order {
            Some(order) => order,
            None => conn.query_row(
                "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM categories WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?,
        };

        conn.execute(
            "INSERT INTO categories (user_id, name, color, sort_order) VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                data.name,
                data.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR),
                sort_order,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, user_id, id)?.ok_or(DbError::NotFound { entity: "Category", id })
    }

    /// Get a category by ID, scoped to its owner
    pub fn get_by_id(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM categories WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row([id, user_id], Self::from_row) {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a category by exact name (case-insensitive)
    pub fn get_by_name(conn: &Connection, user_id: i64, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM categories WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE",
        )?;

        match stmt.query_row(params![user_id, name], Self::from_row) {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's categories with gear counts, in display order
    pub fn list_with_stats(conn: &Connection, user_id: i64) -> DbResult<Vec<CategoryWithStats>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.name, c.color, c.sort_order,
                   COUNT(g.id) AS gear_count,
                   COALESCE(SUM(g.weight_grams), 0) AS catalog_weight_grams
            FROM categories c
            LEFT JOIN gear_items g ON g.category_id = c.id
            WHERE c.user_id = ?1
            GROUP BY c.id
            ORDER BY c.sort_order ASC, c.name ASC
            "#,
        )?;

        let categories = stmt
            .query_map([user_id], |row| {
                Ok(CategoryWithStats {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    color: row.get("color")?,
                    sort_order: row.get("sort_order")?,
                    gear_count: row.get("gear_count")?,
                    catalog_weight_grams: row.get("catalog_weight_grams")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Update a category
    pub fn update(conn: &Connection, user_id: i64, id: i64, data: &CategoryUpdate) -> DbResult<Option<Self>> {
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
        add_update!(color, "color");
        add_update!(sort_order, "sort_order");

        if updates.is_empty() {
            return Self::get_by_id(conn, user_id, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE categories SET {} WHERE id = ?{} AND user_id = ?{}",
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

    /// Count gear items in this category
    pub fn gear_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM gear_items WHERE category_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a category. Its gear becomes uncategorized.
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
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

    fn create(conn: &Connection, user_id: i64, name: &str) -> Category {
        Category::create(
            conn,
            user_id,
            &CategoryCreate {
                name: name.to_string(),
                color: None,
                sort_order: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_color_validation() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#A1b2C3"));
        assert!(!is_valid_color("fff"));
        assert!(!is_valid_color("#ffff"));
        assert!(!is_valid_color("#ggg"));
    }

    #[test]
    fn test_sort_order_appends() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let (user, _) = User::get_or_create(conn, "u")?;
            let shelter = create(conn, user.id, "Shelter");
            let sleep = create(conn, user.id, "Sleep");
            assert_eq!(shelter.sort_order, 0);
            assert_eq!(sleep.sort_order, 1);
            assert_eq!(shelter.color, DEFAULT_CATEGORY_COLOR);

            let found = Category::get_by_name(conn, user.id, "shelter")?.unwrap();
            assert_eq!(found.id, shelter.id);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_scoped_to_user() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let (alice, _) = User::get_or_create(conn, "alice")?;
            let (bob, _) = User::get_or_create(conn, "bob")?;
            let cat = create(conn, alice.id, "Kitchen");

            assert!(Category::get_by_id(conn, bob.id, cat.id)?.is_none());
            assert!(!Category::delete(conn, bob.id, cat.id)?);
            assert!(Category::list_with_stats(conn, bob.id)?.is_empty());

            // Same name is fine for a different user
            create(conn, bob.id, "Kitchen");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_update() {
        let (_dir, db) = temp_database();
        db.with_conn(|conn| {
            let (user, _) = User::get_or_create(conn, "u")?;
            let cat = create(conn, user.id, "Misc");
            let update = CategoryUpdate {
                name: Some("Essentials".to_string()),
                color: Some("#ff0000".to_string()),
                sort_order: None,
            };
            let cat = Category::update(conn, user.id, cat.id, &update)?.unwrap();
            assert_eq!(cat.name, "Essentials");
            assert_eq!(cat.color, "#ff0000");
            Ok(())
        })
        .unwrap();
    }
}

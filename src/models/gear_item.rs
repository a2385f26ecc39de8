//! Gear Item model
//!
//! A piece of gear in a user's catalog. Weight is stored in grams.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearItem {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub weight_grams: f64,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new gear item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearItemCreate {
    pub category_id: Option<i64>,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub weight_grams: f64,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// Data for updating a gear item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GearItemUpdate {
    /// `Some(None)` moves the item out of its category
    pub category_id: Option<Option<i64>>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub weight_grams: Option<f64>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl GearItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            category_id: row.get("category_id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            description: row.get("description")?,
            weight_grams: row.get("weight_grams")?,
            url: row.get("url")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new gear item into the database
    pub fn create(conn: &Connection, user_id: i64, data: &GearItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO gear_items (
                user_id, category_id, name, brand, description, weight_grams, url, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user_id,
                data.category_id,
                data.name,
                data.brand,
                data.description,
                data.weight_grams,
                data.url,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, user_id, id)?.ok_or(DbError::NotFound { entity: "Gear item", id })
    }

    /// Get a gear item by ID, scoped to its owner
    pub fn get_by_id(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM gear_items WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row([id, user_id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search gear items by name or brand
    pub fn search(conn: &Connection, user_id: i64, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let search_pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM gear_items
            WHERE user_id = ?1 AND (name LIKE ?2 OR brand LIKE ?2)
            ORDER BY name ASC
            LIMIT ?3
            "#,
        )?;

        let items = stmt
            .query_map(params![user_id, search_pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// List gear items with optional category filter and sorting
    pub fn list(
        conn: &Connection,
        user_id: i64,
        category_id: Option<i64>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.to_lowercase() == "desc" { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "created_at",
            "weight" | "weight_grams" => "weight_grams",
            _ => "name",
        };

        let sql = if category_id.is_some() {
            format!(
                "SELECT * FROM gear_items WHERE user_id = ?1 AND category_id = ?2 ORDER BY {} {}, id ASC LIMIT ?3 OFFSET ?4",
                sort_col, order
            )
        } else {
            format!(
                "SELECT * FROM gear_items WHERE user_id = ?1 ORDER BY {} {}, id ASC LIMIT ?2 OFFSET ?3",
                sort_col, order
            )
        };

        let mut stmt = conn.prepare(&sql)?;

        let items = if let Some(cat) = category_id {
            stmt.query_map(params![user_id, cat, limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![user_id, limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(items)
    }

    /// Count a user's gear items (optionally within one category)
    pub fn count(conn: &Connection, user_id: i64, category_id: Option<i64>) -> DbResult<i64> {
        let count: i64 = if let Some(cat) = category_id {
            conn.query_row(
                "SELECT COUNT(*) FROM gear_items WHERE user_id = ?1 AND category_id = ?2",
                [user_id, cat],
                |row| row.get(0),
            )?
        } else {
            conn.query_row(
                "SELECT COUNT(*) FROM gear_items WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?
        };
        Ok(count)
    }

    /// Update a gear item
    pub fn update(conn: &Connection, user_id: i64, id: i64, data: &GearItemUpdate) -> DbResult<Option<Self>> {
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

        add_update!(category_id, "category_id");
        add_update!(name, "name");
        add_update!(brand, "brand");
        add_update!(description, "description");
        add_update!(weight_grams, "weight_grams");
        add_update!(url, "url");
        add_update!(notes, "notes");

        if updates.is_empty() {
            return Self::get_by_id(conn, user_id, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE gear_items SET {} WHERE id = ?{} AND user_id = ?{}",
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

    /// Number of pack lists this gear item appears in
    pub fn get_usage_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pack_list_items WHERE gear_item_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Names of the pack lists this gear item appears in
    pub fn get_used_in_pack_lists(conn: &Connection, id: i64) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT p.name FROM pack_lists p
            INNER JOIN pack_list_items pli ON p.id = pli.pack_list_id
            WHERE pli.gear_item_id = ?1
            ORDER BY p.name
            "#,
        )?;

        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Gear items that are not in any pack list
    pub fn list_unused(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT g.* FROM gear_items g
            WHERE g.user_id = ?1 AND NOT EXISTS (
                SELECT 1 FROM pack_list_items pli WHERE pli.gear_item_id = g.id
            )
            ORDER BY g.name ASC
            "#,
        )?;

        let items = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Delete a gear item. Fails with a foreign key error if any pack list uses it.
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM gear_items WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows > 0)
    }
}

//! Pack List Item model
//!
//! Links a gear item into a pack list with a quantity and the flags that
//! decide how it counts toward pack weight.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::weight::{
    compute_breakdown, GearLineItem, WeightBreakdown, WeightResult, DEFAULT_CATEGORY_COLOR,
    UNCATEGORIZED_NAME,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackListItem {
    pub id: i64,
    pub pack_list_id: i64,
    pub gear_item_id: i64,
    pub quantity: u32,
    pub is_included: bool,
    pub is_worn: bool,
    pub is_consumable: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Pack list item joined with its gear and category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackListItemDetail {
    pub id: i64,
    pub gear_item_id: i64,
    pub gear_name: String,
    pub brand: Option<String>,
    pub weight_grams: f64,
    pub quantity: u32,
    pub is_included: bool,
    pub is_worn: bool,
    pub is_consumable: bool,
    pub category_id: Option<i64>,
    pub category_name: String,
    pub category_color: String,
    pub notes: Option<String>,
}

impl PackListItemDetail {
    /// The aggregation's view of this row
    pub fn to_line_item(&self) -> WeightResult<GearLineItem> {
        Ok(GearLineItem::new(self.weight_grams, self.quantity)?
            .included(self.is_included)
            .worn(self.is_worn)
            .consumable(self.is_consumable)
            .category(self.category_id, self.category_name.as_str(), self.category_color.as_str()))
    }
}

/// Data for adding gear to a pack list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackListItemCreate {
    pub pack_list_id: i64,
    pub gear_item_id: i64,
    pub quantity: u32,
    pub is_included: bool,
    pub is_worn: bool,
    pub is_consumable: bool,
    pub notes: Option<String>,
}

/// Data for updating a pack list item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackListItemUpdate {
    pub quantity: Option<u32>,
    pub is_included: Option<bool>,
    pub is_worn: Option<bool>,
    pub is_consumable: Option<bool>,
    pub notes: Option<String>,
}

impl PackListItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            pack_list_id: row.get("pack_list_id")?,
            gear_item_id: row.get("gear_item_id")?,
            quantity: row.get("quantity")?,
            is_included: row.get("is_included")?,
            is_worn: row.get("is_worn")?,
            is_consumable: row.get("is_consumable")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Add gear to a pack list
    pub fn create(conn: &Connection, data: &PackListItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO pack_list_items (
                pack_list_id, gear_item_id, quantity, is_included, is_worn, is_consumable, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.pack_list_id,
                data.gear_item_id,
                data.quantity,
                data.is_included,
                data.is_worn,
                data.is_consumable,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Pack list item", id })
    }

    /// Get an item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM pack_list_items WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get an item by ID, only if its pack list belongs to the user
    pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT pli.* FROM pack_list_items pli
            INNER JOIN pack_lists p ON p.id = pli.pack_list_id
            WHERE pli.id = ?1 AND p.user_id = ?2
            "#,
        )?;

        match stmt.query_row([id, user_id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the gear item is already in the pack list
    pub fn exists_in_list(conn: &Connection, pack_list_id: i64, gear_item_id: i64) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pack_list_items WHERE pack_list_id = ?1 AND gear_item_id = ?2",
            [pack_list_id, gear_item_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get all items with gear and category details, in the order they were added
    pub fn get_details_for_pack_list(conn: &Connection, pack_list_id: i64) -> DbResult<Vec<PackListItemDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT pli.id, pli.gear_item_id, g.name AS gear_name, g.brand, g.weight_grams,
                   pli.quantity, pli.is_included, pli.is_worn, pli.is_consumable,
                   g.category_id, c.name AS category_name, c.color AS category_color,
                   pli.notes
            FROM pack_list_items pli
            INNER JOIN gear_items g ON pli.gear_item_id = g.id
            LEFT JOIN categories c ON g.category_id = c.id
            WHERE pli.pack_list_id = ?1
            ORDER BY pli.id
            "#,
        )?;

        let details = stmt
            .query_map([pack_list_id], |row| {
                Ok(PackListItemDetail {
                    id: row.get("id")?,
                    gear_item_id: row.get("gear_item_id")?,
                    gear_name: row.get("gear_name")?,
                    brand: row.get("brand")?,
                    weight_grams: row.get("weight_grams")?,
                    quantity: row.get("quantity")?,
                    is_included: row.get("is_included")?,
                    is_worn: row.get("is_worn")?,
                    is_consumable: row.get("is_consumable")?,
                    category_id: row.get("category_id")?,
                    category_name: row
                        .get::<_, Option<String>>("category_name")?
                        .unwrap_or_else(|| UNCATEGORIZED_NAME.to_string()),
                    category_color: row
                        .get::<_, Option<String>>("category_color")?
                        .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
                    notes: row.get("notes")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(details)
    }

    /// Update a pack list item
    pub fn update(conn: &Connection, id: i64, data: &PackListItemUpdate) -> DbResult<Option<Self>> {
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

        add_update!(quantity, "quantity");
        add_update!(is_included, "is_included");
        add_update!(is_worn, "is_worn");
        add_update!(is_consumable, "is_consumable");
        add_update!(notes, "notes");

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE pack_list_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Remove an item from its pack list
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM pack_list_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// Load a pack list's items and compute its weight breakdown.
///
/// Rows whose weight can't be aggregated are logged and left out of the
/// breakdown, but still returned in the item list.
pub fn load_pack_list_weights(
    conn: &Connection,
    pack_list_id: i64,
) -> DbResult<(Vec<PackListItemDetail>, WeightBreakdown)> {
    let details = PackListItem::get_details_for_pack_list(conn, pack_list_id)?;

    let line_items: Vec<GearLineItem> = details
        .iter()
        .filter_map(|d| match d.to_line_item() {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(
                    "Skipping pack list item {} ('{}') in weight totals: {}",
                    d.id,
                    d.gear_name,
                    e
                );
                None
            }
        })
        .collect();

    let breakdown = compute_breakdown(&line_items);
    Ok((details, breakdown))
}

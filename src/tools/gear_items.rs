//! Gear Item MCP Tools
//!
//! Tools for managing the gear catalog.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Category, GearItem, GearItemCreate, GearItemUpdate};
use crate::weight::{convert_to_grams, format_weight, WeightUnit, UNCATEGORIZED_NAME};

use super::settings::{load_user, resolve_unit};

/// Input for add_gear_item, with the weight in any unit
#[derive(Debug, Clone)]
pub struct GearItemInput {
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub weight: f64,
    pub weight_unit: Option<String>,
    pub category_id: Option<i64>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// Changes for update_gear_item
#[derive(Debug, Clone, Default)]
pub struct GearItemChanges {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub category_id: Option<i64>,
    pub clear_category: bool,
    pub url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddGearItemResponse {
    pub id: i64,
    pub name: String,
    pub weight_grams: f64,
    pub weight: String,
    pub created_at: String,
}

/// Summary of a gear item for list/search results
#[derive(Debug, Serialize)]
pub struct GearItemSummary {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub category_id: Option<i64>,
    pub weight_grams: f64,
    pub weight: String,
}

impl GearItemSummary {
    fn new(item: &GearItem, unit: WeightUnit) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            brand: item.brand.clone(),
            category_id: item.category_id,
            weight_grams: item.weight_grams,
            weight: format_weight(item.weight_grams, unit, None, true),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GearItemDetail {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: String,
    pub weight_grams: f64,
    pub weight: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub usage_count: i64,
    pub used_in_pack_lists: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchGearItemsResponse {
    pub items: Vec<GearItemSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ListGearItemsResponse {
    pub items: Vec<GearItemSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateGearItemResponse {
    pub success: bool,
    pub weight_grams: f64,
    pub updated_at: String,
    /// Pack lists whose totals changed because of this edit
    pub pack_lists_affected: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ListUnusedGearItemsResponse {
    pub items: Vec<GearItemSummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteGearItemBlockedResponse {
    pub error: String,
    pub usage_count: i64,
    pub used_in_pack_lists: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteGearItemSuccessResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn trimmed_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Gear item name cannot be empty".to_string());
    }
    Ok(name.to_string())
}

fn ensure_category(conn: &Connection, user_id: i64, category_id: i64) -> Result<(), String> {
    Category::get_by_id(conn, user_id, category_id)
        .map_err(|e| format!("Database error: {}", e))?
        .map(|_| ())
        .ok_or_else(|| format!("Category not found with id: {}", category_id))
}

/// Add a gear item. The weight is converted to grams from the given unit,
/// or from the user's preferred unit when none is given.
pub fn add_gear_item(db: &Database, user_id: i64, input: GearItemInput) -> Result<AddGearItemResponse, String> {
    let name = trimmed_name(&input.name)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = load_user(&conn, user_id)?;

    let unit = resolve_unit(input.weight_unit.as_deref(), user.weight_unit)?;
    let weight_grams = convert_to_grams(input.weight, unit).map_err(|e| e.to_string())?;

    if let Some(cat) = input.category_id {
        ensure_category(&conn, user_id, cat)?;
    }

    let data = GearItemCreate {
        category_id: input.category_id,
        name,
        brand: input.brand,
        description: input.description,
        weight_grams,
        url: input.url,
        notes: input.notes,
    };

    let item = GearItem::create(&conn, user_id, &data)
        .map_err(|e| format!("Failed to create gear item: {}", e))?;

    tracing::info!("Added gear item '{}' ({:.1}g)", item.name, item.weight_grams);
    Ok(AddGearItemResponse {
        id: item.id,
        weight: format_weight(item.weight_grams, user.weight_unit, None, true),
        name: item.name,
        weight_grams: item.weight_grams,
        created_at: item.created_at,
    })
}

/// Get a gear item with category and pack list usage
pub fn get_gear_item(db: &Database, user_id: i64, id: i64) -> Result<Option<GearItemDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;

    let item = match GearItem::get_by_id(&conn, user_id, id)
        .map_err(|e| format!("Failed to get gear item: {}", e))?
    {
        Some(item) => item,
        None => return Ok(None),
    };

    let category_name = match item.category_id {
        Some(cat) => Category::get_by_id(&conn, user_id, cat)
            .map_err(|e| format!("Failed to get category: {}", e))?
            .map(|c| c.name),
        None => None,
    }
    .unwrap_or_else(|| UNCATEGORIZED_NAME.to_string());

    let usage_count = GearItem::get_usage_count(&conn, id)
        .map_err(|e| format!("Failed to get usage count: {}", e))?;
    let used_in_pack_lists = GearItem::get_used_in_pack_lists(&conn, id)
        .map_err(|e| format!("Failed to get pack list usage: {}", e))?;

    Ok(Some(GearItemDetail {
        id: item.id,
        name: item.name,
        brand: item.brand,
        description: item.description,
        category_id: item.category_id,
        category_name,
        weight_grams: item.weight_grams,
        weight: format_weight(item.weight_grams, unit, None, true),
        url: item.url,
        notes: item.notes,
        created_at: item.created_at,
        updated_at: item.updated_at,
        usage_count,
        used_in_pack_lists,
    }))
}

/// Search gear by name or brand
pub fn search_gear_items(db: &Database, user_id: i64, query: &str, limit: i64) -> Result<SearchGearItemsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;

    let items = GearItem::search(&conn, user_id, query, limit)
        .map_err(|e| format!("Search failed: {}", e))?;

    let items: Vec<GearItemSummary> = items.iter().map(|g| GearItemSummary::new(g, unit)).collect();
    let total = items.len();

    Ok(SearchGearItemsResponse { items, total })
}

/// List gear with optional category filter, sorting and pagination
pub fn list_gear_items(
    db: &Database,
    user_id: i64,
    category_id: Option<i64>,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListGearItemsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;

    let items = GearItem::list(&conn, user_id, category_id, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list gear items: {}", e))?;
    let total = GearItem::count(&conn, user_id, category_id)
        .map_err(|e| format!("Failed to count gear items: {}", e))?;

    Ok(ListGearItemsResponse {
        items: items.iter().map(|g| GearItemSummary::new(g, unit)).collect(),
        total,
        limit,
        offset,
    })
}

/// Update a gear item
pub fn update_gear_item(
    db: &Database,
    user_id: i64,
    id: i64,
    changes: GearItemChanges,
) -> Result<UpdateGearItemResponse, String> {
    let name = changes.name.as_deref().map(trimmed_name).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = load_user(&conn, user_id)?;

    let weight_grams = match changes.weight {
        Some(w) => {
            let unit = resolve_unit(changes.weight_unit.as_deref(), user.weight_unit)?;
            Some(convert_to_grams(w, unit).map_err(|e| e.to_string())?)
        }
        None => None,
    };

    let category_id = if changes.clear_category {
        Some(None)
    } else if let Some(cat) = changes.category_id {
        ensure_category(&conn, user_id, cat)?;
        Some(Some(cat))
    } else {
        None
    };

    let data = GearItemUpdate {
        category_id,
        name,
        brand: changes.brand,
        description: changes.description,
        weight_grams,
        url: changes.url,
        notes: changes.notes,
    };

    let item = GearItem::update(&conn, user_id, id, &data)
        .map_err(|e| format!("Failed to update gear item: {}", e))?
        .ok_or_else(|| format!("Gear item not found with id: {}", id))?;

    let pack_lists_affected = if data.weight_grams.is_some() || data.category_id.is_some() {
        GearItem::get_used_in_pack_lists(&conn, id)
            .map_err(|e| format!("Failed to get pack list usage: {}", e))?
    } else {
        Vec::new()
    };

    Ok(UpdateGearItemResponse {
        success: true,
        weight_grams: item.weight_grams,
        updated_at: item.updated_at,
        pack_lists_affected,
    })
}

/// Gear items not in any pack list (safe to delete)
pub fn list_unused_gear_items(db: &Database, user_id: i64) -> Result<ListUnusedGearItemsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;

    let items: Vec<GearItemSummary> = GearItem::list_unused(&conn, user_id)
        .map_err(|e| format!("Failed to list unused gear: {}", e))?
        .iter()
        .map(|g| GearItemSummary::new(g, unit))
        .collect();
    let count = items.len();

    Ok(ListUnusedGearItemsResponse { items, count })
}

/// Delete a gear item (blocked if any pack list uses it)
pub fn delete_gear_item(
    db: &Database,
    user_id: i64,
    id: i64,
) -> Result<Result<DeleteGearItemSuccessResponse, DeleteGearItemBlockedResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if GearItem::get_by_id(&conn, user_id, id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Gear item not found with id: {}", id));
    }

    let usage_count = GearItem::get_usage_count(&conn, id)
        .map_err(|e| format!("Failed to check usage: {}", e))?;

    if usage_count > 0 {
        let used_in_pack_lists = GearItem::get_used_in_pack_lists(&conn, id)
            .map_err(|e| format!("Failed to get pack list usage: {}", e))?;

        tracing::warn!("Refusing to delete gear item {}: in {} pack list(s)", id, usage_count);
        return Ok(Err(DeleteGearItemBlockedResponse {
            error: format!("Cannot delete gear item: used in {} pack list(s)", usage_count),
            usage_count,
            used_in_pack_lists,
        }));
    }

    GearItem::delete(&conn, user_id, id)
        .map_err(|e| format!("Failed to delete gear item: {}", e))?;

    tracing::info!("Deleted gear item {}", id);
    Ok(Ok(DeleteGearItemSuccessResponse {
        success: true,
        deleted_id: id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::models::User;

    fn setup() -> (tempfile::TempDir, Database, i64) {
        let (dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "hiker")?.0.id)).unwrap();
        (dir, db, user_id)
    }

    fn input(name: &str, weight: f64, unit: Option<&str>) -> GearItemInput {
        GearItemInput {
            name: name.to_string(),
            brand: None,
            description: None,
            weight,
            weight_unit: unit.map(str::to_string),
            category_id: None,
            url: None,
            notes: None,
        }
    }

    #[test]
    fn test_add_converts_to_grams() {
        let (_dir, db, user_id) = setup();

        let resp = add_gear_item(&db, user_id, input("Tent", 1.5, Some("kg"))).unwrap();
        assert!((resp.weight_grams - 1500.0).abs() < 1e-9);
        assert_eq!(resp.weight, "1500 g");

        // No unit: falls back to the user's preference
        crate::tools::settings::set_weight_unit(&db, user_id, "oz").unwrap();
        let resp = add_gear_item(&db, user_id, input("Spork", 0.35274, None)).unwrap();
        assert!((resp.weight_grams - 10.0).abs() < 1e-6);
        assert_eq!(resp.weight, "0.35 oz");
    }

    #[test]
    fn test_add_validation() {
        let (_dir, db, user_id) = setup();
        assert!(add_gear_item(&db, user_id, input(" ", 10.0, None)).is_err());
        assert!(add_gear_item(&db, user_id, input("Rock", -1.0, None)).is_err());
        assert!(add_gear_item(&db, user_id, input("Rock", f64::NAN, None)).is_err());
        assert!(add_gear_item(&db, user_id, input("Rock", 1.0, Some("stone"))).is_err());

        let mut bad_cat = input("Rock", 1.0, None);
        bad_cat.category_id = Some(999);
        assert!(add_gear_item(&db, user_id, bad_cat).is_err());
    }

    #[test]
    fn test_update_and_detail() {
        let (_dir, db, user_id) = setup();
        let id = add_gear_item(&db, user_id, input("Quilt", 600.0, Some("g"))).unwrap().id;

        let changes = GearItemChanges {
            weight: Some(1.0),
            weight_unit: Some("lb".to_string()),
            notes: Some("20F".to_string()),
            ..Default::default()
        };
        let resp = update_gear_item(&db, user_id, id, changes).unwrap();
        assert!((resp.weight_grams - 1.0 / 0.00220462).abs() < 1e-6);
        assert!(resp.pack_lists_affected.is_empty());

        let detail = get_gear_item(&db, user_id, id).unwrap().unwrap();
        assert_eq!(detail.notes.as_deref(), Some("20F"));
        assert_eq!(detail.category_name, UNCATEGORIZED_NAME);
        assert_eq!(detail.usage_count, 0);

        assert!(get_gear_item(&db, user_id, 12345).unwrap().is_none());
        assert!(update_gear_item(&db, user_id, 12345, GearItemChanges::default()).is_err());
    }

    #[test]
    fn test_list_and_search() {
        let (_dir, db, user_id) = setup();
        for (name, grams) in [("Stove", 73.0), ("Pot", 110.0), ("Lighter", 20.0)] {
            add_gear_item(&db, user_id, input(name, grams, Some("g"))).unwrap();
        }

        let list = list_gear_items(&db, user_id, None, "weight", "asc", 2, 0).unwrap();
        assert_eq!(list.total, 3);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].name, "Lighter");

        let clamped = list_gear_items(&db, user_id, None, "name", "asc", 0, -5).unwrap();
        assert_eq!(clamped.limit, 1);
        assert_eq!(clamped.offset, 0);

        let found = search_gear_items(&db, user_id, "po", 20).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(list_unused_gear_items(&db, user_id).unwrap().count, 3);
    }

    #[test]
    fn test_delete_unused() {
        let (_dir, db, user_id) = setup();
        let id = add_gear_item(&db, user_id, input("Extra socks", 60.0, None)).unwrap().id;

        let resp = delete_gear_item(&db, user_id, id).unwrap();
        assert!(resp.is_ok());
        assert!(delete_gear_item(&db, user_id, id).is_err());
    }
}

//! Pack List MCP Tools
//!
//! Tools for building pack lists and reading their weight breakdowns.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::{
    load_pack_list_weights, GearItem, PackList, PackListCreate, PackListItem, PackListItemCreate,
    PackListItemDetail, PackListItemUpdate, PackListUpdate,
};
use crate::weight::{FormatPolicy, WeightBreakdown, WeightSummary, WeightUnit};

use super::conversions::build_policy;
use super::settings::{load_user, resolve_unit};

/// One gear item to put in a pack list
#[derive(Debug, Clone)]
pub struct PackListItemInput {
    pub gear_item_id: i64,
    pub quantity: u32,
    pub is_included: bool,
    pub is_worn: bool,
    pub is_consumable: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PackListResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub share_slug: Option<String>,
    pub updated_at: String,
}

impl From<PackList> for PackListResponse {
    fn from(p: PackList) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            is_public: p.is_public,
            share_slug: p.share_slug,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PackListSummary {
    pub id: i64,
    pub name: String,
    pub is_public: bool,
    pub item_count: usize,
    pub total_weight_grams: f64,
    pub base_weight_grams: f64,
    pub total_weight: String,
    pub base_weight: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListPackListsResponse {
    pub pack_lists: Vec<PackListSummary>,
    pub total: usize,
}

/// Full pack list view: items plus computed weights
#[derive(Debug, Serialize)]
pub struct PackListDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub share_slug: Option<String>,
    pub items: Vec<PackListItemDetail>,
    pub breakdown: WeightBreakdown,
    pub summary: WeightSummary,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct PackListWeightsResponse {
    pub pack_list_id: i64,
    pub name: String,
    pub breakdown: WeightBreakdown,
    pub summary: WeightSummary,
}

#[derive(Debug, Serialize)]
pub struct PackListItemResponse {
    pub id: i64,
    pub pack_list_id: i64,
    pub gear_item_id: i64,
    pub quantity: u32,
    pub is_included: bool,
    pub is_worn: bool,
    pub is_consumable: bool,
    /// Pack totals after the change
    pub total_weight: String,
    pub base_weight: String,
}

#[derive(Debug, Serialize)]
pub struct AddPackListItemsResponse {
    pub pack_list_id: i64,
    pub added: Vec<i64>,
    pub total_weight: String,
    pub base_weight: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn trimmed_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Pack list name cannot be empty".to_string());
    }
    Ok(name.to_string())
}

fn validate_quantity(quantity: u32) -> Result<(), String> {
    if quantity == 0 {
        return Err("Quantity must be at least 1".to_string());
    }
    Ok(())
}

fn owned_list(conn: &Connection, user_id: i64, id: i64) -> Result<PackList, String> {
    PackList::get_by_id(conn, user_id, id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Pack list not found with id: {}", id))
}

/// Total and base weight of a list, rendered in `unit`
fn formatted_totals(conn: &Connection, pack_list_id: i64, unit: WeightUnit) -> Result<(String, String), String> {
    let (_, breakdown) = load_pack_list_weights(conn, pack_list_id)
        .map_err(|e| format!("Failed to compute weights: {}", e))?;
    let summary = breakdown.summarize(&FormatPolicy::fixed(unit));
    Ok((summary.total, summary.base))
}

/// Checks shared by single and batch item adds
fn insert_item(conn: &Connection, user_id: i64, pack_list_id: i64, input: &PackListItemInput) -> Result<PackListItem, String> {
    validate_quantity(input.quantity)?;
    let gear = GearItem::get_by_id(conn, user_id, input.gear_item_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Gear item not found with id: {}", input.gear_item_id))?;

    if PackListItem::exists_in_list(conn, pack_list_id, gear.id).map_err(|e| format!("Database error: {}", e))? {
        return Err(format!("'{}' is already in this pack list", gear.name));
    }

    let data = PackListItemCreate {
        pack_list_id,
        gear_item_id: gear.id,
        quantity: input.quantity,
        is_included: input.is_included,
        is_worn: input.is_worn,
        is_consumable: input.is_consumable,
        notes: input.notes.clone(),
    };

    PackListItem::create(conn, &data).map_err(|e| format!("Failed to add '{}': {}", gear.name, e))
}

/// Create an empty pack list
pub fn create_pack_list(db: &Database, user_id: i64, name: &str, description: Option<String>) -> Result<PackListResponse, String> {
    let name = trimmed_name(name)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = PackList::create(&conn, user_id, &PackListCreate { name, description })
        .map_err(|e| format!("Failed to create pack list: {}", e))?;

    tracing::info!("Created pack list '{}' (id {})", list.name, list.id);
    Ok(list.into())
}

/// List the user's pack lists with their totals
pub fn list_pack_lists(db: &Database, user_id: i64) -> Result<ListPackListsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let policy = FormatPolicy::fixed(load_user(&conn, user_id)?.weight_unit);

    let lists = PackList::list(&conn, user_id)
        .map_err(|e| format!("Failed to list pack lists: {}", e))?;

    let mut pack_lists = Vec::with_capacity(lists.len());
    for list in lists {
        let (_, breakdown) = load_pack_list_weights(&conn, list.id)
            .map_err(|e| format!("Failed to compute weights for '{}': {}", list.name, e))?;
        let summary = breakdown.summarize(&policy);

        pack_lists.push(PackListSummary {
            id: list.id,
            name: list.name,
            is_public: list.is_public,
            item_count: breakdown.item_count,
            total_weight_grams: breakdown.total_weight,
            base_weight_grams: breakdown.base_weight,
            total_weight: summary.total,
            base_weight: summary.base,
            updated_at: list.updated_at,
        });
    }

    let total = pack_lists.len();
    Ok(ListPackListsResponse { pack_lists, total })
}

/// Get a pack list with items, breakdown and a summary in the user's unit
pub fn get_pack_list(db: &Database, user_id: i64, id: i64, sort_categories: bool) -> Result<Option<PackListDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let policy = FormatPolicy::fixed(load_user(&conn, user_id)?.weight_unit);

    let list = match PackList::get_by_id(&conn, user_id, id).map_err(|e| format!("Database error: {}", e))? {
        Some(list) => list,
        None => return Ok(None),
    };

    let (items, mut breakdown) = load_pack_list_weights(&conn, id)
        .map_err(|e| format!("Failed to compute weights: {}", e))?;
    if sort_categories {
        breakdown = breakdown.sorted_by_weight();
    }
    let summary = breakdown.summarize(&policy);

    Ok(Some(PackListDetail {
        id: list.id,
        name: list.name,
        description: list.description,
        is_public: list.is_public,
        share_slug: list.share_slug,
        items,
        breakdown,
        summary,
        created_at: list.created_at,
        updated_at: list.updated_at,
    }))
}

/// Breakdown rendered under a caller-chosen policy
pub fn get_pack_list_weights(
    db: &Database,
    user_id: i64,
    id: i64,
    unit: Option<&str>,
    imperial_auto: bool,
    precision: u32,
) -> Result<PackListWeightsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = load_user(&conn, user_id)?;
    let unit = resolve_unit(unit, user.weight_unit)?;
    let policy = build_policy(unit, None, true, imperial_auto, precision)?;

    let list = owned_list(&conn, user_id, id)?;
    let (_, breakdown) = load_pack_list_weights(&conn, id)
        .map_err(|e| format!("Failed to compute weights: {}", e))?;

    Ok(PackListWeightsResponse {
        pack_list_id: list.id,
        name: list.name,
        summary: breakdown.summarize(&policy),
        breakdown,
    })
}

/// Rename or re-describe a pack list
pub fn update_pack_list(
    db: &Database,
    user_id: i64,
    id: i64,
    name: Option<&str>,
    description: Option<String>,
) -> Result<PackListResponse, String> {
    let name = name.map(trimmed_name).transpose()?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    PackList::update(&conn, user_id, id, &PackListUpdate { name, description })
        .map_err(|e| format!("Failed to update pack list: {}", e))?
        .map(PackListResponse::from)
        .ok_or_else(|| format!("Pack list not found with id: {}", id))
}

/// Delete a pack list and its items
pub fn delete_pack_list(db: &Database, user_id: i64, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = PackList::delete(&conn, user_id, id)
        .map_err(|e| format!("Failed to delete pack list: {}", e))?;
    if !deleted {
        return Err(format!("Pack list not found with id: {}", id));
    }

    tracing::info!("Deleted pack list {}", id);
    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Copy a pack list. The copy is private; name defaults to "<name> (copy)".
pub fn duplicate_pack_list(db: &Database, user_id: i64, id: i64, name: Option<&str>) -> Result<PackListResponse, String> {
    let name = name.map(trimmed_name).transpose()?;

    db.with_transaction(|tx| {
        let source = match PackList::get_by_id(tx, user_id, id)? {
            Some(list) => list,
            None => return Ok(None),
        };
        let name = name.unwrap_or_else(|| format!("{} (copy)", source.name));
        PackList::duplicate(tx, user_id, id, &name)
    })
    .map_err(|e| format!("Failed to duplicate pack list: {}", e))?
    .map(PackListResponse::from)
    .ok_or_else(|| format!("Pack list not found with id: {}", id))
}

/// Put one gear item in a pack list
pub fn add_pack_list_item(
    db: &Database,
    user_id: i64,
    pack_list_id: i64,
    input: PackListItemInput,
) -> Result<PackListItemResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;
    owned_list(&conn, user_id, pack_list_id)?;

    let item = insert_item(&conn, user_id, pack_list_id, &input)?;
    PackList::touch(&conn, pack_list_id).map_err(|e| format!("Database error: {}", e))?;

    let (total_weight, base_weight) = formatted_totals(&conn, pack_list_id, unit)?;

    Ok(PackListItemResponse {
        id: item.id,
        pack_list_id: item.pack_list_id,
        gear_item_id: item.gear_item_id,
        quantity: item.quantity,
        is_included: item.is_included,
        is_worn: item.is_worn,
        is_consumable: item.is_consumable,
        total_weight,
        base_weight,
    })
}

/// Put several gear items in a pack list. All or nothing.
pub fn add_pack_list_items(
    db: &Database,
    user_id: i64,
    pack_list_id: i64,
    inputs: Vec<PackListItemInput>,
) -> Result<AddPackListItemsResponse, String> {
    if inputs.is_empty() {
        return Err("No items to add".to_string());
    }

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;
    owned_list(&conn, user_id, pack_list_id)?;

    let tx = conn.transaction().map_err(|e| format!("Database error: {}", e))?;
    let mut added = Vec::with_capacity(inputs.len());
    for input in &inputs {
        // Dropping tx on error rolls the whole batch back
        let item = insert_item(&tx, user_id, pack_list_id, input)?;
        added.push(item.id);
    }
    PackList::touch(&tx, pack_list_id).map_err(|e| format!("Database error: {}", e))?;
    tx.commit().map_err(|e| format!("Failed to commit: {}", e))?;

    tracing::info!("Added {} items to pack list {}", added.len(), pack_list_id);
    let (total_weight, base_weight) = formatted_totals(&conn, pack_list_id, unit)?;

    Ok(AddPackListItemsResponse {
        pack_list_id,
        added,
        total_weight,
        base_weight,
    })
}

/// Change an item's quantity, flags or notes
pub fn update_pack_list_item(
    db: &Database,
    user_id: i64,
    id: i64,
    data: PackListItemUpdate,
) -> Result<PackListItemResponse, String> {
    if let Some(quantity) = data.quantity {
        validate_quantity(quantity)?;
    }
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;

    PackListItem::get_owned(&conn, user_id, id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Pack list item not found with id: {}", id))?;

    let item = PackListItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update pack list item: {}", e))?
        .ok_or_else(|| format!("Pack list item not found with id: {}", id))?;
    PackList::touch(&conn, item.pack_list_id).map_err(|e| format!("Database error: {}", e))?;

    let (total_weight, base_weight) = formatted_totals(&conn, item.pack_list_id, unit)?;

    Ok(PackListItemResponse {
        id: item.id,
        pack_list_id: item.pack_list_id,
        gear_item_id: item.gear_item_id,
        quantity: item.quantity,
        is_included: item.is_included,
        is_worn: item.is_worn,
        is_consumable: item.is_consumable,
        total_weight,
        base_weight,
    })
}

/// Take an item out of its pack list (the gear stays in the catalog)
pub fn remove_pack_list_item(db: &Database, user_id: i64, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = PackListItem::get_owned(&conn, user_id, id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Pack list item not found with id: {}", id))?;

    PackListItem::delete(&conn, id).map_err(|e| format!("Failed to remove pack list item: {}", e))?;
    PackList::touch(&conn, item.pack_list_id).map_err(|e| format!("Database error: {}", e))?;

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

//! UGM MCP Server Implementation
//!
//! Implements the MCP server with all UGM tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{CategoryCreate, CategoryUpdate, PackListItemUpdate};
use crate::tools::categories;
use crate::tools::conversions;
use crate::tools::gear_items::{self, GearItemChanges, GearItemInput};
use crate::tools::pack_lists::{self, PackListItemInput};
use crate::tools::settings;
use crate::tools::sharing;
use crate::tools::status::StatusTracker;
use crate::weight::{FormatPolicy, WeightUnit};

/// UGM MCP Service
#[derive(Clone)]
pub struct UgmService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// Every tool acts on behalf of this user
    user_id: i64,
    tool_router: ToolRouter<UgmService>,
}

impl UgmService {
    pub fn new(database_path: PathBuf, database: Database, user_id: i64, username: &str) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, username))),
            database,
            user_id,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, id: i64) -> CallToolResult {
    CallToolResult::success(vec![Content::text(format!(r#"{{"error": "{} not found", "id": {}}}"#, what, id))])
}

// ============================================================================
// Gear Item Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddGearItemParams {
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// Weight of one item, in `weight_unit`
    pub weight: f64,
    /// g, kg, oz or lb (defaults to the user's preferred unit)
    pub weight_unit: Option<String>,
    pub category_id: Option<i64>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GearItemIdParams {
    /// Gear item ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchGearItemsParams {
    /// Matched against name and brand
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListGearItemsParams {
    /// Only gear in this category
    pub category_id: Option<i64>,
    /// Sort by: name, weight, or created_at (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc (default asc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String { "name".to_string() }
fn default_sort_order() -> String { "asc".to_string() }
fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGearItemParams {
    /// Gear item ID to update
    pub id: i64,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// New weight, in `weight_unit`
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    /// Move to this category
    pub category_id: Option<i64>,
    /// Make the item uncategorized (default false)
    #[serde(default)]
    pub clear_category: bool,
    pub url: Option<String>,
    pub notes: Option<String>,
}

// ============================================================================
// Category Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateCategoryParams {
    pub name: String,
    /// Hex color, #rgb or #rrggbb
    pub color: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCategoryParams {
    /// Category ID to update
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CategoryIdParams {
    /// Category ID
    pub id: i64,
}

// ============================================================================
// Pack List Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreatePackListParams {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetPackListParams {
    /// Pack list ID
    pub id: i64,
    /// Order categories heaviest first (default false: order of first appearance)
    #[serde(default)]
    pub sort_categories: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PackListIdParams {
    /// Pack list ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdatePackListParams {
    /// Pack list ID to update
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DuplicatePackListParams {
    /// Pack list ID to copy
    pub id: i64,
    /// Name for the copy (default "<name> (copy)")
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PackListItemParams {
    pub gear_item_id: i64,
    /// How many of this gear item (default 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Going on this trip (default true)
    #[serde(default = "default_true")]
    pub is_included: bool,
    /// Worn rather than carried (default false)
    #[serde(default)]
    pub is_worn: bool,
    /// Used up during the trip (default false)
    #[serde(default)]
    pub is_consumable: bool,
    pub notes: Option<String>,
}

fn default_quantity() -> u32 { 1 }
fn default_true() -> bool { true }

impl From<PackListItemParams> for PackListItemInput {
    fn from(p: PackListItemParams) -> Self {
        Self {
            gear_item_id: p.gear_item_id,
            quantity: p.quantity,
            is_included: p.is_included,
            is_worn: p.is_worn,
            is_consumable: p.is_consumable,
            notes: p.notes,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddPackListItemParams {
    pub pack_list_id: i64,
    #[serde(flatten)]
    pub item: PackListItemParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddPackListItemsParams {
    pub pack_list_id: i64,
    /// Items to add; if any one fails, none are added
    pub items: Vec<PackListItemParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdatePackListItemParams {
    /// Pack list item ID (not the gear item ID)
    pub id: i64,
    pub quantity: Option<u32>,
    pub is_included: Option<bool>,
    pub is_worn: Option<bool>,
    pub is_consumable: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PackListItemIdParams {
    /// Pack list item ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetPackListWeightsParams {
    /// Pack list ID
    pub id: i64,
    /// g, kg, oz or lb (defaults to the user's preferred unit)
    pub unit: Option<String>,
    /// Render as "X oz" / "N lb X oz" instead of a fixed unit (default false)
    #[serde(default)]
    pub imperial_auto: bool,
    /// Decimal places for ounces in imperial_auto mode, 0-10 (default 2)
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 { 2 }

// ============================================================================
// Sharing Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetSharedPackListParams {
    /// Share slug from share_pack_list
    pub slug: String,
    /// Render as "X oz" / "N lb X oz" instead of the owner's unit (default false)
    #[serde(default)]
    pub imperial_auto: bool,
    #[serde(default = "default_precision")]
    pub precision: u32,
}

// ============================================================================
// Settings & Conversion Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetWeightUnitParams {
    /// g, kg, oz or lb
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetDisplayNameParams {
    /// Name shown on shared pack lists; empty or omitted clears it
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertWeightParams {
    pub value: f64,
    pub from_unit: String,
    pub to_unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormatWeightParams {
    pub grams: f64,
    /// g, kg, oz or lb (defaults to the user's preferred unit)
    pub unit: Option<String>,
    /// Decimal places, 0-10 (defaults to the unit's usual precision)
    pub decimals: Option<u32>,
    /// Append the unit label (default true)
    #[serde(default = "default_true")]
    pub show_unit: bool,
    #[serde(default)]
    pub imperial_auto: bool,
    #[serde(default = "default_precision")]
    pub precision: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ParseWeightInputParams {
    /// Text the user typed, e.g. "12.5"
    pub input: String,
    /// Unit the number is in
    pub unit: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl UgmService {
    // --- Status ---

    #[tool(description = "Get the current status of the UGM service including build info, database status, active user, and process information")]
    async fn ugm_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for tracking gear and building pack lists, including how worn/consumable/included flags affect base weight. Call this when starting a gear session or when unsure how to use the tools.")]
    fn gear_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::GEAR_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(GEAR_INSTRUCTIONS)]))
    }

    // --- Gear Items ---

    #[tool(description = "Add a gear item to the catalog. Weight is given in weight_unit (or the user's preferred unit) and stored in grams.")]
    fn add_gear_item(&self, Parameters(p): Parameters<AddGearItemParams>) -> Result<CallToolResult, McpError> {
        let input = GearItemInput {
            name: p.name, brand: p.brand, description: p.description,
            weight: p.weight, weight_unit: p.weight_unit, category_id: p.category_id,
            url: p.url, notes: p.notes,
        };
        let result = gear_items::add_gear_item(&self.database, self.user_id, input).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get full details for a gear item including its category and the pack lists that use it")]
    fn get_gear_item(&self, Parameters(p): Parameters<GearItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = gear_items::get_gear_item(&self.database, self.user_id, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => to_json(&item),
            None => Ok(not_found("Gear item", p.id)),
        }
    }

    #[tool(description = "Search gear items by name or brand")]
    fn search_gear_items(&self, Parameters(p): Parameters<SearchGearItemsParams>) -> Result<CallToolResult, McpError> {
        let result = gear_items::search_gear_items(&self.database, self.user_id, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List gear items with optional category filter, sorting, and pagination")]
    fn list_gear_items(&self, Parameters(p): Parameters<ListGearItemsParams>) -> Result<CallToolResult, McpError> {
        let result = gear_items::list_gear_items(&self.database, self.user_id, p.category_id, &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update a gear item. Weight changes show up in every pack list using the item.")]
    fn update_gear_item(&self, Parameters(p): Parameters<UpdateGearItemParams>) -> Result<CallToolResult, McpError> {
        let changes = GearItemChanges {
            name: p.name, brand: p.brand, description: p.description,
            weight: p.weight, weight_unit: p.weight_unit,
            category_id: p.category_id, clear_category: p.clear_category,
            url: p.url, notes: p.notes,
        };
        let result = gear_items::update_gear_item(&self.database, self.user_id, p.id, changes)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a gear item (only allowed if not used in any pack list)")]
    fn delete_gear_item(&self, Parameters(p): Parameters<GearItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = gear_items::delete_gear_item(&self.database, self.user_id, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(success) => to_json(&success),
            Err(blocked) => to_json(&blocked),
        }
    }

    #[tool(description = "List gear items that are not in any pack list (candidates for cleanup)")]
    fn list_unused_gear_items(&self) -> Result<CallToolResult, McpError> {
        let result = gear_items::list_unused_gear_items(&self.database, self.user_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Categories ---

    #[tool(description = "Create a gear category such as Shelter, Sleep, or Kitchen")]
    fn create_category(&self, Parameters(p): Parameters<CreateCategoryParams>) -> Result<CallToolResult, McpError> {
        let data = CategoryCreate { name: p.name, color: p.color, sort_order: p.sort_order };
        let result = categories::create_category(&self.database, self.user_id, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List categories with gear counts and catalog weight")]
    fn list_categories(&self) -> Result<CallToolResult, McpError> {
        let result = categories::list_categories(&self.database, self.user_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Rename, recolor, or reorder a category")]
    fn update_category(&self, Parameters(p): Parameters<UpdateCategoryParams>) -> Result<CallToolResult, McpError> {
        let data = CategoryUpdate { name: p.name, color: p.color, sort_order: p.sort_order };
        let result = categories::update_category(&self.database, self.user_id, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a category. Its gear items become uncategorized.")]
    fn delete_category(&self, Parameters(p): Parameters<CategoryIdParams>) -> Result<CallToolResult, McpError> {
        let result = categories::delete_category(&self.database, self.user_id, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Pack Lists ---

    #[tool(description = "Create an empty pack list")]
    fn create_pack_list(&self, Parameters(p): Parameters<CreatePackListParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::create_pack_list(&self.database, self.user_id, &p.name, p.description)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List pack lists with item counts and total/base weight")]
    fn list_pack_lists(&self) -> Result<CallToolResult, McpError> {
        let result = pack_lists::list_pack_lists(&self.database, self.user_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a pack list with its items, weight breakdown (total, base, worn, consumable, per category), and formatted summary")]
    fn get_pack_list(&self, Parameters(p): Parameters<GetPackListParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::get_pack_list(&self.database, self.user_id, p.id, p.sort_categories)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(list) => to_json(&list),
            None => Ok(not_found("Pack list", p.id)),
        }
    }

    #[tool(description = "Rename a pack list or change its description")]
    fn update_pack_list(&self, Parameters(p): Parameters<UpdatePackListParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::update_pack_list(&self.database, self.user_id, p.id, p.name.as_deref(), p.description)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a pack list and its items. Gear stays in the catalog.")]
    fn delete_pack_list(&self, Parameters(p): Parameters<PackListIdParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::delete_pack_list(&self.database, self.user_id, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Copy a pack list with all its items. The copy is private.")]
    fn duplicate_pack_list(&self, Parameters(p): Parameters<DuplicatePackListParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::duplicate_pack_list(&self.database, self.user_id, p.id, p.name.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add a gear item to a pack list with quantity and worn/consumable/included flags")]
    fn add_pack_list_item(&self, Parameters(p): Parameters<AddPackListItemParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::add_pack_list_item(&self.database, self.user_id, p.pack_list_id, p.item.into())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add several gear items to a pack list at once. If any item fails, none are added.")]
    fn add_pack_list_items(&self, Parameters(p): Parameters<AddPackListItemsParams>) -> Result<CallToolResult, McpError> {
        let inputs = p.items.into_iter().map(PackListItemInput::from).collect();
        let result = pack_lists::add_pack_list_items(&self.database, self.user_id, p.pack_list_id, inputs)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Change a pack list item's quantity, flags, or notes")]
    fn update_pack_list_item(&self, Parameters(p): Parameters<UpdatePackListItemParams>) -> Result<CallToolResult, McpError> {
        let data = PackListItemUpdate {
            quantity: p.quantity, is_included: p.is_included, is_worn: p.is_worn,
            is_consumable: p.is_consumable, notes: p.notes,
        };
        let result = pack_lists::update_pack_list_item(&self.database, self.user_id, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove an item from its pack list")]
    fn remove_pack_list_item(&self, Parameters(p): Parameters<PackListItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::remove_pack_list_item(&self.database, self.user_id, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a pack list's weight breakdown rendered in a chosen unit, or in imperial_auto style (\"2 lb 3.3 oz\")")]
    fn get_pack_list_weights(&self, Parameters(p): Parameters<GetPackListWeightsParams>) -> Result<CallToolResult, McpError> {
        let result = pack_lists::get_pack_list_weights(&self.database, self.user_id, p.id, p.unit.as_deref(), p.imperial_auto, p.precision)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Sharing ---

    #[tool(description = "Make a pack list public and get its share slug. Re-sharing keeps the same slug.")]
    fn share_pack_list(&self, Parameters(p): Parameters<PackListIdParams>) -> Result<CallToolResult, McpError> {
        let result = sharing::share_pack_list(&self.database, self.user_id, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Make a pack list private again. Its share slug stops working.")]
    fn unshare_pack_list(&self, Parameters(p): Parameters<PackListIdParams>) -> Result<CallToolResult, McpError> {
        let result = sharing::unshare_pack_list(&self.database, self.user_id, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Read any public pack list by its share slug, with weights in the owner's preferred unit")]
    fn get_shared_pack_list(&self, Parameters(p): Parameters<GetSharedPackListParams>) -> Result<CallToolResult, McpError> {
        let policy = p.imperial_auto.then_some(FormatPolicy::ImperialAuto { precision: p.precision });
        let result = sharing::get_shared_pack_list(&self.database, &p.slug, policy).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(list) => to_json(&list),
            None => Ok(CallToolResult::success(vec![Content::text(
                serde_json::json!({ "error": "Shared pack list not found", "slug": p.slug }).to_string(),
            )])),
        }
    }

    // --- Settings ---

    #[tool(description = "Get the active user's settings, including the preferred weight unit")]
    fn get_settings(&self) -> Result<CallToolResult, McpError> {
        let result = settings::get_settings(&self.database, self.user_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Set the preferred display unit for weights: g, kg, oz, or lb")]
    fn set_weight_unit(&self, Parameters(p): Parameters<SetWeightUnitParams>) -> Result<CallToolResult, McpError> {
        let result = settings::set_weight_unit(&self.database, self.user_id, &p.unit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Set the name shown as owner on shared pack lists")]
    fn set_display_name(&self, Parameters(p): Parameters<SetDisplayNameParams>) -> Result<CallToolResult, McpError> {
        let result = settings::set_display_name(&self.database, self.user_id, p.display_name.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Conversions ---

    #[tool(description = "Convert a weight between g, kg, oz, and lb")]
    fn convert_weight(&self, Parameters(p): Parameters<ConvertWeightParams>) -> Result<CallToolResult, McpError> {
        let result = conversions::convert_weight(p.value, &p.from_unit, &p.to_unit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Format a weight in grams for display, in a fixed unit or imperial_auto style")]
    fn format_weight(&self, Parameters(p): Parameters<FormatWeightParams>) -> Result<CallToolResult, McpError> {
        let unit = match p.unit.as_deref() {
            Some(u) => WeightUnit::from_str(u)
                .ok_or_else(|| McpError::invalid_params(format!("Unknown weight unit '{}'", u), None))?,
            None => settings::get_settings(&self.database, self.user_id)
                .map_err(|e| McpError::internal_error(e, None))?
                .weight_unit,
        };
        let policy = conversions::build_policy(unit, p.decimals, p.show_unit, p.imperial_auto, p.precision)
            .map_err(|e| McpError::invalid_params(e, None))?;
        let result = conversions::format_weight(p.grams, policy).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Parse text a user typed as a weight in the given unit. Returns grams, or null when the input is not a valid weight.")]
    fn parse_weight_input(&self, Parameters(p): Parameters<ParseWeightInputParams>) -> Result<CallToolResult, McpError> {
        let result = conversions::parse_weight_input(&p.input, &p.unit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for UgmService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ugm".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Universal Gear Manager".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Universal Gear Manager (UGM) - Backpacking gear catalog and pack list weights. \
                 IMPORTANT: Call gear_instructions first for how weights, units, and worn/consumable flags work. \
                 Gear: add/get/search/list/update/delete_gear_item, list_unused_gear_items. \
                 Categories: create/list/update/delete_category. \
                 Pack lists: create/list/get/update/delete/duplicate_pack_list, \
                 add_pack_list_item(s), update/remove_pack_list_item, get_pack_list_weights. \
                 Sharing: share/unshare_pack_list, get_shared_pack_list. \
                 Settings: get_settings, set_weight_unit, set_display_name. \
                 Conversions: convert_weight, format_weight, parse_weight_input. \
                 All weights are stored in grams; pass weight_unit when entering weights."
                    .into(),
            ),
        }
    }
}

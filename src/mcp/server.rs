//! Larder MCP Server Implementation
//!
//! Implements the MCP server with all Larder tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::costing::BaseUnit;
use crate::db::Database;
use crate::models::{
    InventoryItemCreate, InventoryItemUpdate, PriceUpdate, RecipeCreate, RecipeUpdate, ShiftCreate,
};
use crate::tools::inventory;
use crate::tools::prices;
use crate::tools::recipes;
use crate::tools::recipes::IngredientInput;
use crate::tools::shifts;
use crate::tools::status::StatusTracker;

/// Larder MCP Service
#[derive(Clone)]
pub struct LarderService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<LarderService>,
}

impl LarderService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Parse a base unit string or produce a caller-facing error
fn parse_base_unit(s: &str) -> Result<BaseUnit, McpError> {
    BaseUnit::from_str(s).ok_or_else(|| {
        McpError::invalid_params(
            format!("Unknown base unit '{}'; valid values: kg, l, count", s),
            None,
        )
    })
}

// ============================================================================
// Inventory Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddInventoryItemParams {
    /// Item name (e.g., "Harina 0000")
    pub name: String,
    /// Base costing unit: kg, l, or count
    pub base_unit: String,
    /// Stock on hand, in base_unit
    #[serde(default)]
    pub quantity_on_hand: f64,
    /// Price per one base_unit
    pub unit_price: f64,
    /// Optional notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchInventoryItemsParams {
    /// Search query (matches name)
    pub query: String,
    /// Maximum results (default 20)
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetInventoryItemParams {
    /// Inventory item ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListInventoryItemsParams {
    /// Sort by: name, created_at, or unit_price (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc (default asc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String { "name".to_string() }
fn default_sort_order() -> String { "asc".to_string() }
fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateInventoryItemParams {
    /// Inventory item ID
    pub id: i64,
    /// New name (optional)
    pub name: Option<String>,
    /// New base unit: kg, l, or count (optional; existing recipe rows keep
    /// their units and may become incompatible)
    pub base_unit: Option<String>,
    /// New stock on hand (optional)
    pub quantity_on_hand: Option<f64>,
    /// New price per base_unit (optional)
    pub unit_price: Option<f64>,
    /// New notes (optional)
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteInventoryItemParams {
    /// Inventory item ID to delete
    pub id: i64,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParam {
    /// Inventory item ID
    pub item_id: i64,
    /// Quantity used, in `unit`
    pub quantity: f64,
    /// Unit: g, kg, ml, l, or count. Must be compatible with the item's
    /// base unit. Defaults to the item's small-scale unit when omitted.
    pub unit: Option<String>,
}

impl From<IngredientParam> for IngredientInput {
    fn from(p: IngredientParam) -> Self {
        IngredientInput {
            item_id: p.item_id,
            quantity: p.quantity,
            unit: p.unit,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    /// Name of the recipe
    pub name: String,
    /// Full ingredient list (at least one entry, every quantity > 0)
    pub ingredients: Vec<IngredientParam>,
    /// Optional notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    /// Recipe ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Search query for recipe name (optional)
    pub query: Option<String>,
    /// Sort by: name or created_at (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc (default asc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    /// Recipe ID to update
    pub id: i64,
    /// New name (optional)
    pub name: Option<String>,
    /// Replacement ingredient list (optional; replaces the whole list)
    pub ingredients: Option<Vec<IngredientParam>>,
    /// New notes (optional)
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteRecipeParams {
    /// Recipe ID to delete
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewRecipeCostParams {
    /// Draft ingredient list; rows that cannot be costed contribute zero
    pub ingredients: Vec<IngredientParam>,
}

// ============================================================================
// Price Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExtractPriceSuggestionsParams {
    /// Path to the supplier's PDF price list
    pub pdf_path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PriceUpdateParam {
    /// Inventory item ID
    pub item_id: i64,
    /// New price per base unit
    pub new_price: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApplyPriceUpdatesParams {
    /// Price changes to apply in one transaction
    pub updates: Vec<PriceUpdateParam>,
}

// ============================================================================
// Shift Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterShiftParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Clock-in time: HH:MM
    pub clock_in: String,
    /// Clock-out time: HH:MM (earlier than clock_in means past midnight)
    pub clock_out: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListShiftsParams {
    /// Maximum results (default 50)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl LarderService {
    // --- Status ---

    #[tool(description = "Get the current status of the Larder service including build info, database status, entity counts, and process information")]
    async fn larder_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for inventory units, recipe costing rules, and the price-update workflow. Call this when starting a session or when unsure how the costing tools fit together.")]
    fn costing_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::COSTING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(COSTING_INSTRUCTIONS)]))
    }

    // --- Inventory ---

    #[tool(description = "Create a new inventory item priced per base unit (kg, l, or count)")]
    fn add_inventory_item(&self, Parameters(p): Parameters<AddInventoryItemParams>) -> Result<CallToolResult, McpError> {
        let data = InventoryItemCreate {
            name: p.name,
            base_unit: parse_base_unit(&p.base_unit)?,
            quantity_on_hand: p.quantity_on_hand,
            unit_price: p.unit_price,
            notes: p.notes,
        };
        let result = inventory::add_inventory_item(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Search inventory items by name")]
    fn search_inventory_items(&self, Parameters(p): Parameters<SearchInventoryItemsParams>) -> Result<CallToolResult, McpError> {
        let result = inventory::search_inventory_items(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get full details for an inventory item including which recipes use it")]
    fn get_inventory_item(&self, Parameters(p): Parameters<GetInventoryItemParams>) -> Result<CallToolResult, McpError> {
        let result = inventory::get_inventory_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(item) => serde_json::to_string_pretty(&item),
            None => Ok(format!(r#"{{"error": "Inventory item not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List inventory items with sorting and pagination")]
    fn list_inventory_items(&self, Parameters(p): Parameters<ListInventoryItemsParams>) -> Result<CallToolResult, McpError> {
        let result = inventory::list_inventory_items(&self.database, &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update an inventory item's name, base unit, stock, price, or notes")]
    fn update_inventory_item(&self, Parameters(p): Parameters<UpdateInventoryItemParams>) -> Result<CallToolResult, McpError> {
        let base_unit = match p.base_unit {
            Some(ref s) => Some(parse_base_unit(s)?),
            None => None,
        };
        let data = InventoryItemUpdate {
            name: p.name,
            base_unit,
            quantity_on_hand: p.quantity_on_hand,
            unit_price: p.unit_price,
            notes: p.notes,
        };
        let result = inventory::update_inventory_item(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(updated) => serde_json::to_string_pretty(&updated),
            None => Ok(format!(r#"{{"error": "Inventory item not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete an inventory item. Recipes referencing it keep dangling rows that cost zero; use list_dangling_ingredients to find them.")]
    fn delete_inventory_item(&self, Parameters(p): Parameters<DeleteInventoryItemParams>) -> Result<CallToolResult, McpError> {
        let result = inventory::delete_inventory_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Recipes ---

    #[tool(description = "Create a recipe with its full ingredient list. Requires a non-empty name, at least one ingredient, every quantity > 0, and units compatible with each item's base unit.")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate { name: p.name, notes: p.notes };
        let ingredients = p.ingredients.into_iter().map(IngredientInput::from).collect();
        let result = recipes::create_recipe(&self.database, data, ingredients).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get full recipe details with ingredients and cost at current prices")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(recipe) => serde_json::to_string_pretty(&recipe),
            None => Ok(format!(r#"{{"error": "Recipe not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List recipes with ingredient count and cost at current prices")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.query.as_deref(), &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a recipe's name or notes, and/or replace its whole ingredient list")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeUpdate { name: p.name, notes: p.notes };
        let ingredients = p.ingredients.map(|list| list.into_iter().map(IngredientInput::from).collect());
        let result = recipes::update_recipe(&self.database, p.id, data, ingredients).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a recipe and its ingredient rows")]
    fn delete_recipe(&self, Parameters(p): Parameters<DeleteRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Cost a draft ingredient list against current prices without saving anything. Rows that cannot be costed contribute zero.")]
    fn preview_recipe_cost(&self, Parameters(p): Parameters<PreviewRecipeCostParams>) -> Result<CallToolResult, McpError> {
        let ingredients = p.ingredients.into_iter().map(IngredientInput::from).collect();
        let result = recipes::preview_recipe_cost(&self.database, ingredients).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List recipe ingredient rows whose inventory item was deleted (they cost zero until the recipe is edited)")]
    fn list_dangling_ingredients(&self) -> Result<CallToolResult, McpError> {
        let result = recipes::list_dangling_ingredients(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Prices ---

    #[tool(description = "Analyze a supplier's PDF price list with the extraction API and suggest price updates for matching inventory items. Review the suggestions, then call apply_price_updates.")]
    async fn extract_price_suggestions(&self, Parameters(p): Parameters<ExtractPriceSuggestionsParams>) -> Result<CallToolResult, McpError> {
        // The extraction call blocks on HTTP; keep it off the async executor
        let db = self.database.clone();
        let result = tokio::task::spawn_blocking(move || prices::extract_price_suggestions(&db, &p.pdf_path))
            .await
            .map_err(|e| McpError::internal_error(format!("Task error: {}", e), None))?
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Apply a reviewed set of price updates to inventory items in one transaction")]
    fn apply_price_updates(&self, Parameters(p): Parameters<ApplyPriceUpdatesParams>) -> Result<CallToolResult, McpError> {
        let updates = p.updates.into_iter()
            .map(|u| PriceUpdate { item_id: u.item_id, new_price: u.new_price })
            .collect();
        let result = prices::apply_price_updates(&self.database, updates).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Shifts ---

    #[tool(description = "Register a worked shift; overtime beyond 8 hours is computed automatically")]
    fn register_shift(&self, Parameters(p): Parameters<RegisterShiftParams>) -> Result<CallToolResult, McpError> {
        let data = ShiftCreate { date: p.date, clock_in: p.clock_in, clock_out: p.clock_out };
        let result = shifts::register_shift(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List logged shifts, most recent first")]
    fn list_shifts(&self, Parameters(p): Parameters<ListShiftsParams>) -> Result<CallToolResult, McpError> {
        let result = shifts::list_shifts(&self.database, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for LarderService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "larder".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Larder Inventory & Recipe Costing".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Larder - inventory and recipe cost management for a small food-production business. \
                 IMPORTANT: Call costing_instructions for unit rules and the costing workflow. \
                 Inventory: add/search/get/list/update/delete_inventory_item. \
                 Recipes: create/get/list/update/delete_recipe, preview_recipe_cost, list_dangling_ingredients. \
                 Recipe cost is computed from current prices on every call; deleted items make their rows cost zero. \
                 Prices: extract_price_suggestions (PDF price list via AI extraction), apply_price_updates. \
                 Shifts: register_shift/list_shifts."
                    .into(),
            ),
        }
    }
}

//! Inventory MCP Tools
//!
//! Tools for managing inventory items in the database.

use serde::Serialize;

use crate::costing::BaseUnit;
use crate::db::Database;
use crate::models::{InventoryItem, InventoryItemCreate, InventoryItemUpdate};

/// Response for add_inventory_item
#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub id: i64,
    pub name: String,
    pub base_unit: BaseUnit,
    pub created_at: String,
}

/// Summary of an inventory item for list/search results
#[derive(Debug, Serialize)]
pub struct ItemSummary {
    pub id: i64,
    pub name: String,
    pub base_unit: BaseUnit,
    pub quantity_on_hand: f64,
    pub unit_price: f64,
}

impl From<&InventoryItem> for ItemSummary {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            base_unit: item.base_unit,
            quantity_on_hand: item.quantity_on_hand,
            unit_price: item.unit_price,
        }
    }
}

/// Full inventory item detail response
#[derive(Debug, Serialize)]
pub struct ItemDetail {
    pub id: i64,
    pub name: String,
    pub base_unit: BaseUnit,
    pub quantity_on_hand: f64,
    pub unit_price: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub recipe_usage_count: i64,
    pub used_in_recipes: Vec<String>,
}

/// Response for search_inventory_items
#[derive(Debug, Serialize)]
pub struct SearchItemsResponse {
    pub items: Vec<ItemSummary>,
    pub total: usize,
}

/// Response for list_inventory_items
#[derive(Debug, Serialize)]
pub struct ListItemsResponse {
    pub items: Vec<ItemSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_inventory_item
#[derive(Debug, Serialize)]
pub struct UpdateItemResponse {
    pub success: bool,
    pub updated_at: String,
}

/// Response for delete_inventory_item
#[derive(Debug, Serialize)]
pub struct DeleteItemResponse {
    pub success: bool,
    pub deleted_id: i64,
    /// Recipe ingredient rows that now reference a missing item; they are
    /// costed at zero until the recipes are edited
    pub dangling_ingredient_rows: i64,
}

/// Create a new inventory item
pub fn add_inventory_item(db: &Database, data: InventoryItemCreate) -> Result<AddItemResponse, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Item name cannot be empty".to_string());
    }
    if data.quantity_on_hand < 0.0 {
        return Err("quantity_on_hand cannot be negative".to_string());
    }
    if data.unit_price < 0.0 {
        return Err("unit_price cannot be negative".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = InventoryItem::create(&conn, &data)
        .map_err(|e| format!("Failed to create item: {}", e))?;

    Ok(AddItemResponse {
        id: item.id,
        name: item.name,
        base_unit: item.base_unit,
        created_at: item.created_at,
    })
}

/// Search inventory items by name
pub fn search_inventory_items(
    db: &Database,
    query: &str,
    limit: i64,
) -> Result<SearchItemsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = InventoryItem::search(&conn, query, limit)
        .map_err(|e| format!("Failed to search items: {}", e))?;

    let summaries: Vec<ItemSummary> = items.iter().map(ItemSummary::from).collect();
    let total = summaries.len();

    Ok(SearchItemsResponse {
        items: summaries,
        total,
    })
}

/// Get full details for an inventory item
pub fn get_inventory_item(db: &Database, id: i64) -> Result<Option<ItemDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = InventoryItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get item: {}", e))?;

    match item {
        Some(item) => {
            let recipe_usage_count = InventoryItem::get_recipe_usage_count(&conn, id)
                .map_err(|e| format!("Failed to get usage count: {}", e))?;
            let used_in_recipes = InventoryItem::get_used_in_recipes(&conn, id)
                .map_err(|e| format!("Failed to get recipe names: {}", e))?;

            Ok(Some(ItemDetail {
                id: item.id,
                name: item.name,
                base_unit: item.base_unit,
                quantity_on_hand: item.quantity_on_hand,
                unit_price: item.unit_price,
                notes: item.notes,
                created_at: item.created_at,
                updated_at: item.updated_at,
                recipe_usage_count,
                used_in_recipes,
            }))
        }
        None => Ok(None),
    }
}

/// List inventory items with sorting and pagination
pub fn list_inventory_items(
    db: &Database,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListItemsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = InventoryItem::list(&conn, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list items: {}", e))?;

    let total = InventoryItem::count(&conn)
        .map_err(|e| format!("Failed to count items: {}", e))?;

    Ok(ListItemsResponse {
        items: items.iter().map(ItemSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Update an inventory item
pub fn update_inventory_item(
    db: &Database,
    id: i64,
    data: InventoryItemUpdate,
) -> Result<Option<UpdateItemResponse>, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Item name cannot be empty".to_string());
        }
    }
    if matches!(data.quantity_on_hand, Some(q) if q < 0.0) {
        return Err("quantity_on_hand cannot be negative".to_string());
    }
    if matches!(data.unit_price, Some(p) if p < 0.0) {
        return Err("unit_price cannot be negative".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = InventoryItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update item: {}", e))?;

    Ok(updated.map(|item| UpdateItemResponse {
        success: true,
        updated_at: item.updated_at,
    }))
}

/// Delete an inventory item
///
/// Recipes keep any rows referencing the deleted item; those rows dangle and
/// cost zero from now on. The response reports how many such rows remain.
pub fn delete_inventory_item(db: &Database, id: i64) -> Result<DeleteItemResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let usage = InventoryItem::get_recipe_usage_count(&conn, id)
        .map_err(|e| format!("Failed to check usage: {}", e))?;

    let deleted = InventoryItem::delete(&conn, id)
        .map_err(|e| format!("Failed to delete item: {}", e))?;

    if !deleted {
        return Err(format!("Inventory item not found with id: {}", id));
    }

    if usage > 0 {
        tracing::warn!(
            "deleted inventory item {} still referenced by {} recipe ingredient row(s)",
            id,
            usage
        );
    }

    Ok(DeleteItemResponse {
        success: true,
        deleted_id: id,
        dangling_ingredient_rows: usage,
    })
}

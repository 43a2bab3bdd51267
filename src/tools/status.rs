//! Larder Status Tool
//!
//! Provides runtime status information about the Larder service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{InventoryItem, Recipe, RecipeIngredient};

/// Costing instructions for AI assistants
pub const COSTING_INSTRUCTIONS: &str = r#"
# Larder Costing Instructions

This guide explains how inventory items, recipes, and cost calculation fit
together.

## Units

Every inventory item is priced per one **base unit**:

| base_unit | Meaning | Compatible recipe units |
|-----------|------------------|-------------------------|
| kg | priced per kilogram | g, kg |
| l | priced per liter | ml, l |
| count | priced per piece | count |

Recipe ingredient quantities use the recipe units above. Scale conversion is
automatic (1000 g = 1 kg, 1000 ml = 1 l); family mixing is not allowed - a
mass unit can never be used with a volume-priced item.

## Cost calculation

A recipe's cost is the sum of `unit_price * quantity_in_base_unit` over its
ingredients, computed fresh from current prices on every call. Rows that
cannot be costed contribute zero instead of failing:

- the referenced item was deleted (dangling reference)
- the item's price or the ingredient's quantity is zero or negative
- the units are incompatible (also logged as a warning)

Use `preview_recipe_cost` to cost a draft without saving it, and
`list_dangling_ingredients` to find rows that reference deleted items.

## Typical workflow

1. `add_inventory_item` for each stock item (name, base_unit, quantity, price)
2. `create_recipe` with the full ingredient list (every quantity > 0)
3. `get_recipe` / `list_recipes` report cost at current prices
4. To update prices from a supplier PDF: `extract_price_suggestions`, review,
   then `apply_price_updates`

## Validation rules at save time

- recipe name must be non-empty
- ingredient list must be non-empty
- every ingredient quantity must be > 0
- units must be compatible with the referenced item's base_unit
"#;

/// Runtime status of the Larder service
#[derive(Debug, Clone, Serialize)]
pub struct LarderStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Entity counts
    pub inventory_items: i64,
    pub recipes: i64,
    pub dangling_ingredient_rows: i64,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> Result<LarderStatus, String> {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let inventory_items = InventoryItem::count(&conn)
            .map_err(|e| format!("Failed to count items: {}", e))?;
        let recipes = Recipe::count(&conn)
            .map_err(|e| format!("Failed to count recipes: {}", e))?;
        let dangling_ingredient_rows = RecipeIngredient::count_dangling(&conn)
            .map_err(|e| format!("Failed to count dangling rows: {}", e))?;

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        Ok(LarderStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            inventory_items,
            recipes,
            dangling_ingredient_rows,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        })
    }
}

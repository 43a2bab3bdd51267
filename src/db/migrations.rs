//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    // Get current version
    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Run migrations
    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INVENTORY ITEMS
        -- Stock on hand, priced per base unit
        -- ============================================
        CREATE TABLE inventory_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            base_unit TEXT NOT NULL CHECK(base_unit IN ('kg', 'l', 'count')),
            quantity_on_hand REAL NOT NULL DEFAULT 0,   -- in base_unit
            unit_price REAL NOT NULL DEFAULT 0,         -- per one base_unit

            -- Metadata
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_inventory_items_name ON inventory_items(name);

        -- ============================================
        -- RECIPES
        -- Named ingredient lists
        -- ============================================
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,

            -- Metadata
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipes_name ON recipes(name);

        -- ============================================
        -- RECIPE INGREDIENTS
        -- Ordered rows linking recipes to inventory items.
        -- item_id is a weak reference: no foreign key, so deleting an
        -- inventory item leaves the row dangling and the cost calculator
        -- treats it as a zero-cost contribution.
        -- ============================================
        CREATE TABLE recipe_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            item_id INTEGER NOT NULL,
            quantity REAL NOT NULL,                     -- in unit
            unit TEXT NOT NULL CHECK(unit IN ('g', 'kg', 'ml', 'l', 'count')),
            position INTEGER NOT NULL DEFAULT 0,        -- display order

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id);
        CREATE INDEX idx_recipe_ingredients_item ON recipe_ingredients(item_id);

        -- ============================================
        -- SHIFTS
        -- Work-schedule log with computed overtime
        -- ============================================
        CREATE TABLE shifts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,                         -- ISO date: "2025-01-09"
            clock_in TEXT NOT NULL,                     -- "HH:MM"
            clock_out TEXT NOT NULL,                    -- "HH:MM"
            overtime_hours REAL NOT NULL DEFAULT 0,

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_shifts_date ON shifts(date);
        "#,
    )?;

    Ok(())
}

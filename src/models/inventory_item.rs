//! Inventory Item model
//!
//! Represents a stock item priced per base costing unit.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::costing::BaseUnit;
use crate::db::DbResult;

/// A stock item; quantity and price are denominated in `base_unit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub base_unit: BaseUnit,
    pub quantity_on_hand: f64,
    pub unit_price: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemCreate {
    pub name: String,
    pub base_unit: BaseUnit,
    pub quantity_on_hand: f64,
    pub unit_price: f64,
    pub notes: Option<String>,
}

/// Data for updating an inventory item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub base_unit: Option<BaseUnit>,
    pub quantity_on_hand: Option<f64>,
    pub unit_price: Option<f64>,
    pub notes: Option<String>,
}

/// One price change in a bulk update
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub item_id: i64,
    pub new_price: f64,
}

impl InventoryItem {
    /// Create an InventoryItem from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let unit_str: String = row.get("base_unit")?;
        let base_unit = BaseUnit::from_str(&unit_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("invalid base unit: {}", unit_str).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            base_unit,
            quantity_on_hand: row.get("quantity_on_hand")?,
            unit_price: row.get("unit_price")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new inventory item into the database
    pub fn create(conn: &Connection, data: &InventoryItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO inventory_items (name, base_unit, quantity_on_hand, unit_price, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.name,
                data.base_unit.to_db_str(),
                data.quantity_on_hand,
                data.unit_price,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get an inventory item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM inventory_items WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get inventory items for a set of IDs
    pub fn get_by_ids(conn: &Connection, ids: &[i64]) -> DbResult<Vec<Self>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids_str = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let sql = format!("SELECT * FROM inventory_items WHERE id IN ({})", ids_str);
        let mut stmt = conn.prepare(&sql)?;

        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Get all inventory items ordered by name
    pub fn get_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM inventory_items ORDER BY name ASC")?;

        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Search inventory items by name
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let search_pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM inventory_items
            WHERE name LIKE ?1
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(params![search_pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// List inventory items with sorting and pagination
    pub fn list(
        conn: &Connection,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.to_lowercase() == "desc" { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "created_at",
            "unit_price" => "unit_price",
            _ => "name",
        };

        let sql = format!(
            "SELECT * FROM inventory_items ORDER BY {} {} LIMIT ?1 OFFSET ?2",
            sort_col, order
        );

        let mut stmt = conn.prepare(&sql)?;

        let items = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Update an inventory item
    pub fn update(conn: &Connection, id: i64, data: &InventoryItemUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(base_unit) = data.base_unit {
            updates.push(format!("base_unit = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(base_unit.to_db_str().to_string()));
        }
        if let Some(quantity) = data.quantity_on_hand {
            updates.push(format!("quantity_on_hand = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(quantity));
        }
        if let Some(price) = data.unit_price {
            updates.push(format!("unit_price = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(price));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE inventory_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Apply a bulk price update in one transaction
    ///
    /// Unknown item IDs are skipped. Returns the number of items updated.
    pub fn batch_update_prices(conn: &mut Connection, updates: &[PriceUpdate]) -> DbResult<i64> {
        let tx = conn.transaction()?;
        let mut updated = 0;

        {
            let mut stmt = tx.prepare(
                "UPDATE inventory_items
                 SET unit_price = ?1, updated_at = datetime('now')
                 WHERE id = ?2",
            )?;

            for update in updates {
                updated += stmt.execute(params![update.new_price, update.item_id])? as i64;
            }
        }

        tx.commit()?;
        Ok(updated)
    }

    /// Get the count of recipe ingredient rows referencing this item
    pub fn get_recipe_usage_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipe_ingredients WHERE item_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get recipe names that use this item
    pub fn get_used_in_recipes(conn: &Connection, id: i64) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT r.name FROM recipes r
            INNER JOIN recipe_ingredients ri ON r.id = ri.recipe_id
            WHERE ri.item_id = ?1
            ORDER BY r.name
            "#,
        )?;

        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Count inventory items
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM inventory_items", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete an inventory item
    ///
    /// Never blocked by recipe usage: ingredient rows referencing this item
    /// keep their id and dangle, and the cost calculator treats them as
    /// zero-cost contributions. Returns Ok(true) if deleted, Ok(false) if
    /// not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM inventory_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

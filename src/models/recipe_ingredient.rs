//! Recipe Ingredient model
//!
//! Ordered rows linking a recipe to inventory items, with quantity and unit.
//! The item reference is weak: rows survive deletion of the item they point
//! at, and costing treats such rows as zero-cost.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::costing::{
    compute_cost, IngredientLine, IngredientUnit, InventoryLookup, PricedItem,
};
use crate::db::DbResult;

use super::InventoryItem;

/// A stored recipe ingredient row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub item_id: i64,
    pub quantity: f64,
    pub unit: IngredientUnit,
    pub position: i64,
    pub created_at: String,
}

/// Recipe ingredient with the referenced item's display data
///
/// `item_name` is None when the reference dangles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientDetail {
    pub id: i64,
    pub item_id: i64,
    pub item_name: Option<String>,
    pub quantity: f64,
    pub unit: IngredientUnit,
}

impl RecipeIngredient {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let unit_str: String = row.get("unit")?;
        let unit = IngredientUnit::from_str(&unit_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("invalid ingredient unit: {}", unit_str).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            item_id: row.get("item_id")?,
            quantity: row.get("quantity")?,
            unit,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Get all ingredient rows for a recipe in display order
    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position, id",
        )?;

        let ingredients = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Get ingredients with item names for a recipe
    ///
    /// LEFT JOIN so dangling references still show up, with a missing name.
    pub fn get_details_for_recipe(
        conn: &Connection,
        recipe_id: i64,
    ) -> DbResult<Vec<RecipeIngredientDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT ri.id, ri.item_id, ii.name as item_name, ri.quantity, ri.unit
            FROM recipe_ingredients ri
            LEFT JOIN inventory_items ii ON ri.item_id = ii.id
            WHERE ri.recipe_id = ?1
            ORDER BY ri.position, ri.id
            "#,
        )?;

        let details = stmt
            .query_map([recipe_id], |row| {
                let unit_str: String = row.get("unit")?;
                let unit = IngredientUnit::from_str(&unit_str).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        format!("invalid ingredient unit: {}", unit_str).into(),
                    )
                })?;

                Ok(RecipeIngredientDetail {
                    id: row.get("id")?,
                    item_id: row.get("item_id")?,
                    item_name: row.get("item_name")?,
                    quantity: row.get("quantity")?,
                    unit,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(details)
    }

    /// Replace a recipe's whole ingredient list in one transaction
    ///
    /// Recipes are mutated by wholesale replacement, never row by row.
    pub fn replace_for_recipe(
        conn: &mut Connection,
        recipe_id: i64,
        lines: &[IngredientLine],
    ) -> DbResult<()> {
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
            [recipe_id],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, item_id, quantity, unit, position)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;

            for (position, line) in lines.iter().enumerate() {
                stmt.execute(params![
                    recipe_id,
                    line.item_id,
                    line.quantity,
                    line.unit.to_db_str(),
                    position as i64,
                ])?;
            }
        }

        tx.execute(
            "UPDATE recipes SET updated_at = datetime('now') WHERE id = ?1",
            [recipe_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Ingredient rows as calculator lines
    pub fn lines_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<IngredientLine>> {
        let ingredients = Self::get_for_recipe(conn, recipe_id)?;
        Ok(ingredients
            .iter()
            .map(|ing| IngredientLine {
                item_id: ing.item_id,
                quantity: ing.quantity,
                unit: ing.unit,
            })
            .collect())
    }

    /// Count ingredient rows whose item reference no longer resolves
    pub fn count_dangling(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM recipe_ingredients ri
            WHERE NOT EXISTS (SELECT 1 FROM inventory_items ii WHERE ii.id = ri.item_id)
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Compute the current cost of a stored recipe
///
/// Builds a fresh snapshot of the referenced inventory items and delegates to
/// the pure calculator; dangling or anomalous rows degrade to zero cost.
pub fn recipe_cost(conn: &Connection, recipe_id: i64) -> DbResult<f64> {
    let lines = RecipeIngredient::lines_for_recipe(conn, recipe_id)?;
    cost_of_lines(conn, &lines)
}

/// Compute the cost of an arbitrary ingredient list against current inventory
///
/// Used for stored recipes and for live previews of unsaved drafts alike.
pub fn cost_of_lines(conn: &Connection, lines: &[IngredientLine]) -> DbResult<f64> {
    let mut ids: Vec<i64> = lines.iter().map(|line| line.item_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let items = InventoryItem::get_by_ids(conn, &ids)?;
    let lookup: InventoryLookup = items
        .iter()
        .map(|item| {
            (
                item.id,
                PricedItem {
                    name: &item.name,
                    base_unit: item.base_unit,
                    unit_price: item.unit_price,
                },
            )
        })
        .collect();

    Ok(compute_cost(lines, &lookup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{InventoryItemCreate, Recipe, RecipeCreate};

    fn test_conn() -> rusqlite::Connection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn seed_item(
        conn: &rusqlite::Connection,
        name: &str,
        base_unit: crate::costing::BaseUnit,
        unit_price: f64,
    ) -> InventoryItem {
        InventoryItem::create(
            conn,
            &InventoryItemCreate {
                name: name.to_string(),
                base_unit,
                quantity_on_hand: 10.0,
                unit_price,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_recipe_cost_end_to_end() {
        use crate::costing::BaseUnit;

        let mut conn = test_conn();

        let flour = seed_item(&conn, "Harina 0000", BaseUnit::MassKg, 1.50);
        let eggs = seed_item(&conn, "Huevos", BaseUnit::Count, 0.20);
        let sugar = seed_item(&conn, "Azucar", BaseUnit::MassKg, 1.80);

        let recipe = Recipe::create(
            &conn,
            &RecipeCreate {
                name: "Bizcochuelo Basico".to_string(),
                notes: None,
            },
        )
        .unwrap();

        let lines = vec![
            IngredientLine {
                item_id: flour.id,
                quantity: 0.5,
                unit: IngredientUnit::Kilogram,
            },
            IngredientLine {
                item_id: eggs.id,
                quantity: 4.0,
                unit: IngredientUnit::Count,
            },
            IngredientLine {
                item_id: sugar.id,
                quantity: 0.25,
                unit: IngredientUnit::Kilogram,
            },
        ];
        RecipeIngredient::replace_for_recipe(&mut conn, recipe.id, &lines).unwrap();

        // 1.50*0.5 + 0.20*4 + 1.80*0.25 = 2.00
        let cost = recipe_cost(&conn, recipe.id).unwrap();
        assert!((cost - 2.00).abs() < 1e-9);
    }

    #[test]
    fn test_recipe_cost_with_dangling_reference() {
        use crate::costing::BaseUnit;

        let mut conn = test_conn();

        let flour = seed_item(&conn, "Harina 0000", BaseUnit::MassKg, 1.50);
        let eggs = seed_item(&conn, "Huevos", BaseUnit::Count, 0.20);

        let recipe = Recipe::create(
            &conn,
            &RecipeCreate {
                name: "Masa".to_string(),
                notes: None,
            },
        )
        .unwrap();

        let lines = vec![
            IngredientLine {
                item_id: flour.id,
                quantity: 500.0,
                unit: IngredientUnit::Gram,
            },
            IngredientLine {
                item_id: eggs.id,
                quantity: 2.0,
                unit: IngredientUnit::Count,
            },
        ];
        RecipeIngredient::replace_for_recipe(&mut conn, recipe.id, &lines).unwrap();

        let before = recipe_cost(&conn, recipe.id).unwrap();
        assert!((before - 1.15).abs() < 1e-9);

        // Deleting the item is not blocked; the row dangles and costs zero
        assert!(InventoryItem::delete(&conn, eggs.id).unwrap());
        assert_eq!(RecipeIngredient::count_dangling(&conn).unwrap(), 1);

        let after = recipe_cost(&conn, recipe.id).unwrap();
        assert!((after - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_replace_is_wholesale() {
        use crate::costing::BaseUnit;

        let mut conn = test_conn();

        let milk = seed_item(&conn, "Leche Entera", BaseUnit::VolumeL, 1.10);

        let recipe = Recipe::create(
            &conn,
            &RecipeCreate {
                name: "Crema".to_string(),
                notes: None,
            },
        )
        .unwrap();

        RecipeIngredient::replace_for_recipe(
            &mut conn,
            recipe.id,
            &[IngredientLine {
                item_id: milk.id,
                quantity: 1.0,
                unit: IngredientUnit::Liter,
            }],
        )
        .unwrap();
        assert_eq!(RecipeIngredient::get_for_recipe(&conn, recipe.id).unwrap().len(), 1);

        RecipeIngredient::replace_for_recipe(
            &mut conn,
            recipe.id,
            &[
                IngredientLine {
                    item_id: milk.id,
                    quantity: 250.0,
                    unit: IngredientUnit::Milliliter,
                },
                IngredientLine {
                    item_id: milk.id,
                    quantity: 0.5,
                    unit: IngredientUnit::Liter,
                },
            ],
        )
        .unwrap();

        let rows = RecipeIngredient::get_for_recipe(&conn, recipe.id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 0);
        assert_eq!(rows[1].position, 1);

        let cost = recipe_cost(&conn, recipe.id).unwrap();
        assert!((cost - (0.275 + 0.55)).abs() < 1e-9);
    }
}

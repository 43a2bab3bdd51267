//! Recipe MCP Tools
//!
//! Tools for managing recipes and computing their cost.

use serde::{Deserialize, Serialize};

use crate::costing::{compatible_units, default_unit, is_compatible, IngredientLine, IngredientUnit};
use crate::db::Database;
use crate::models::{
    cost_of_lines, recipe_cost, InventoryItem, Recipe, RecipeCreate, RecipeIngredient,
    RecipeIngredientDetail, RecipeUpdate,
};

/// One ingredient as supplied by the caller
///
/// `unit` is optional; when omitted it defaults to the referenced item's
/// small-scale unit (g for kg-priced items, ml for l-priced, count for
/// count-priced).
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub item_id: i64,
    pub quantity: f64,
    pub unit: Option<String>,
}

/// Response for create_recipe
#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: i64,
    pub name: String,
    pub total_cost: f64,
    pub created_at: String,
}

/// Full recipe detail with ingredients and computed cost
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<RecipeIngredientDetail>,
    pub total_cost: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub ingredient_count: usize,
    pub total_cost: f64,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_recipe
#[derive(Debug, Serialize)]
pub struct RecipeUpdateResponse {
    pub success: bool,
    pub total_cost: f64,
    pub updated_at: String,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct RecipeDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for preview_recipe_cost
#[derive(Debug, Serialize)]
pub struct PreviewCostResponse {
    pub total_cost: f64,
    pub line_count: usize,
}

/// A recipe ingredient row whose item reference no longer resolves
#[derive(Debug, Serialize)]
pub struct DanglingIngredientRow {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub ingredient_id: i64,
    pub item_id: i64,
}

/// Response for list_dangling_ingredients
#[derive(Debug, Serialize)]
pub struct ListDanglingResponse {
    pub rows: Vec<DanglingIngredientRow>,
    pub count: usize,
}

/// Parse one ingredient's unit, defaulting from the referenced item
fn resolve_unit(
    conn: &rusqlite::Connection,
    input: &IngredientInput,
) -> Result<IngredientUnit, String> {
    if let Some(ref s) = input.unit {
        return IngredientUnit::from_str(s)
            .ok_or_else(|| format!("Unknown unit '{}'; valid units: g, kg, ml, l, count", s));
    }

    let item = InventoryItem::get_by_id(conn, input.item_id)
        .map_err(|e| format!("Database error checking item: {}", e))?;

    match item {
        Some(item) => Ok(default_unit(item.base_unit)),
        None => Err(format!(
            "Item {} not found in inventory; specify a unit explicitly",
            input.item_id
        )),
    }
}

/// Save-time resolution and validation of an ingredient list
///
/// The calculator itself tolerates anything; this is the gate that keeps
/// obviously broken rows from being persisted. Unknown item IDs pass (the
/// reference is weak by design), but a resolvable item must be paired with a
/// compatible unit and every quantity must be positive.
fn resolve_ingredients(
    conn: &rusqlite::Connection,
    inputs: &[IngredientInput],
) -> Result<Vec<IngredientLine>, String> {
    if inputs.is_empty() {
        return Err("Recipe must have at least one ingredient".to_string());
    }

    let mut lines = Vec::with_capacity(inputs.len());

    for input in inputs {
        if input.quantity <= 0.0 {
            return Err(format!(
                "Ingredient quantity must be greater than zero (item {})",
                input.item_id
            ));
        }

        let unit = resolve_unit(conn, input)?;

        let item = InventoryItem::get_by_id(conn, input.item_id)
            .map_err(|e| format!("Database error checking item: {}", e))?;

        if let Some(item) = item {
            if !is_compatible(item.base_unit, unit) {
                let valid: Vec<&str> = compatible_units(item.base_unit)
                    .iter()
                    .map(|u| u.as_str())
                    .collect();
                return Err(format!(
                    "Unit {} is not compatible with {} (priced per {}); valid units: {}",
                    unit.as_str(),
                    item.name,
                    item.base_unit.as_str(),
                    valid.join(", ")
                ));
            }
        }

        lines.push(IngredientLine {
            item_id: input.item_id,
            quantity: input.quantity,
            unit,
        });
    }

    Ok(lines)
}

/// Lenient resolution for live previews
///
/// A draft under editing may hold transiently invalid rows; those are kept
/// (the calculator degrades them to zero cost), and only rows whose unit
/// cannot be determined at all are dropped.
fn resolve_ingredients_lenient(
    conn: &rusqlite::Connection,
    inputs: &[IngredientInput],
) -> Vec<IngredientLine> {
    let mut lines = Vec::with_capacity(inputs.len());

    for input in inputs {
        match resolve_unit(conn, input) {
            Ok(unit) => lines.push(IngredientLine {
                item_id: input.item_id,
                quantity: input.quantity,
                unit,
            }),
            Err(reason) => {
                tracing::warn!("skipping draft ingredient row: {}", reason);
            }
        }
    }

    lines
}

/// Create a new recipe with its full ingredient list
pub fn create_recipe(
    db: &Database,
    data: RecipeCreate,
    ingredients: Vec<IngredientInput>,
) -> Result<CreateRecipeResponse, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Recipe name cannot be empty".to_string());
    }

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let lines = resolve_ingredients(&conn, &ingredients)?;

    let recipe = Recipe::create(&conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    RecipeIngredient::replace_for_recipe(&mut conn, recipe.id, &lines)
        .map_err(|e| format!("Failed to store ingredients: {}", e))?;

    let total_cost = recipe_cost(&conn, recipe.id)
        .map_err(|e| format!("Failed to compute cost: {}", e))?;

    Ok(CreateRecipeResponse {
        id: recipe.id,
        name: recipe.name,
        total_cost,
        created_at: recipe.created_at,
    })
}

/// Get a recipe with ingredients and current cost
pub fn get_recipe(db: &Database, id: i64) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?;

    match recipe {
        Some(recipe) => {
            let ingredients = RecipeIngredient::get_details_for_recipe(&conn, id)
                .map_err(|e| format!("Failed to get ingredients: {}", e))?;

            let total_cost = recipe_cost(&conn, id)
                .map_err(|e| format!("Failed to compute cost: {}", e))?;

            Ok(Some(RecipeDetail {
                id: recipe.id,
                name: recipe.name,
                ingredients,
                total_cost,
                notes: recipe.notes,
                created_at: recipe.created_at,
                updated_at: recipe.updated_at,
            }))
        }
        None => Ok(None),
    }
}

/// List recipes with current cost per recipe
pub fn list_recipes(
    db: &Database,
    query: Option<&str>,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListRecipesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list(&conn, query, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    let total = Recipe::count(&conn)
        .map_err(|e| format!("Failed to count recipes: {}", e))?;

    let mut summaries = Vec::new();
    for recipe in recipes {
        let ingredients = RecipeIngredient::get_for_recipe(&conn, recipe.id)
            .map_err(|e| format!("Failed to get ingredients: {}", e))?;
        let total_cost = recipe_cost(&conn, recipe.id)
            .map_err(|e| format!("Failed to compute cost: {}", e))?;

        summaries.push(RecipeSummary {
            id: recipe.id,
            name: recipe.name,
            ingredient_count: ingredients.len(),
            total_cost,
        });
    }

    Ok(ListRecipesResponse {
        recipes: summaries,
        total,
        limit,
        offset,
    })
}

/// Update a recipe's name/notes and optionally replace its ingredient list
pub fn update_recipe(
    db: &Database,
    id: i64,
    data: RecipeUpdate,
    ingredients: Option<Vec<IngredientInput>>,
) -> Result<RecipeUpdateResponse, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Recipe name cannot be empty".to_string());
        }
    }

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Recipe::get_by_id(&conn, id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Recipe not found with id: {}", id));
    }

    let lines = match ingredients {
        Some(ref inputs) => Some(resolve_ingredients(&conn, inputs)?),
        None => None,
    };

    let updated = Recipe::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", id))?;

    if let Some(lines) = lines {
        RecipeIngredient::replace_for_recipe(&mut conn, id, &lines)
            .map_err(|e| format!("Failed to replace ingredients: {}", e))?;
    }

    let total_cost = recipe_cost(&conn, id)
        .map_err(|e| format!("Failed to compute cost: {}", e))?;

    Ok(RecipeUpdateResponse {
        success: true,
        total_cost,
        updated_at: updated.updated_at,
    })
}

/// Delete a recipe and its ingredient rows
pub fn delete_recipe(db: &Database, id: i64) -> Result<RecipeDeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Recipe::delete(&conn, id)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?;

    if !deleted {
        return Err(format!("Recipe not found with id: {}", id));
    }

    Ok(RecipeDeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Cost an unsaved ingredient list against current inventory
///
/// Used for live previews while a recipe draft is edited; rows that cannot be
/// costed contribute zero instead of failing.
pub fn preview_recipe_cost(
    db: &Database,
    ingredients: Vec<IngredientInput>,
) -> Result<PreviewCostResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let lines = resolve_ingredients_lenient(&conn, &ingredients);

    let total_cost = cost_of_lines(&conn, &lines)
        .map_err(|e| format!("Failed to compute cost: {}", e))?;

    Ok(PreviewCostResponse {
        total_cost,
        line_count: ingredients.len(),
    })
}

/// List ingredient rows whose item reference no longer resolves
///
/// These rows cost zero; the recipes should be edited to drop or re-point
/// them.
pub fn list_dangling_ingredients(db: &Database) -> Result<ListDanglingResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut stmt = conn
        .prepare(
            r#"
            SELECT ri.id as ingredient_id, ri.item_id, r.id as recipe_id, r.name as recipe_name
            FROM recipe_ingredients ri
            INNER JOIN recipes r ON r.id = ri.recipe_id
            WHERE NOT EXISTS (SELECT 1 FROM inventory_items ii WHERE ii.id = ri.item_id)
            ORDER BY r.name, ri.position
            "#,
        )
        .map_err(|e| format!("Failed to prepare query: {}", e))?;

    let rows: Vec<DanglingIngredientRow> = stmt
        .query_map([], |row| {
            Ok(DanglingIngredientRow {
                recipe_id: row.get("recipe_id")?,
                recipe_name: row.get("recipe_name")?,
                ingredient_id: row.get("ingredient_id")?,
                item_id: row.get("item_id")?,
            })
        })
        .map_err(|e| format!("Failed to execute query: {}", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Failed to collect results: {}", e))?;

    let count = rows.len();

    Ok(ListDanglingResponse { rows, count })
}

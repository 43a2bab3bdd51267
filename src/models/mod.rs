//! Data models
//!
//! Rust structs representing database entities.

mod inventory_item;
mod recipe;
mod recipe_ingredient;
mod shift;

pub use inventory_item::{
    InventoryItem, InventoryItemCreate, InventoryItemUpdate, PriceUpdate,
};
pub use recipe::{Recipe, RecipeCreate, RecipeUpdate};
pub use recipe_ingredient::{
    cost_of_lines, recipe_cost, RecipeIngredient, RecipeIngredientDetail,
};
pub use shift::{Shift, ShiftCreate, STANDARD_SHIFT_HOURS};

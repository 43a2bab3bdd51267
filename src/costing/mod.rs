//! Costing module
//!
//! Recipe cost aggregation and the unit conversion table.

pub mod calculator;
pub mod units;

pub use calculator::{compute_cost, IngredientLine, InventoryLookup, PricedItem};
pub use units::{
    compatible_units, default_unit, is_compatible, to_base_factor, BaseUnit, IngredientUnit,
};

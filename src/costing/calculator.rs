//! Recipe cost calculation
//!
//! Aggregates the monetary cost of an ingredient list against a read-only
//! inventory snapshot, converting each quantity into the referenced item's
//! base costing unit. Safe to call on every edit of a recipe draft.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::units::{to_base_factor, BaseUnit, IngredientUnit};

/// One ingredient row as the calculator sees it
///
/// The item reference is weak: it may point at an inventory item that no
/// longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub item_id: i64,
    pub quantity: f64,
    pub unit: IngredientUnit,
}

/// Read-only view of an inventory item, as needed for costing
#[derive(Debug, Clone, Copy)]
pub struct PricedItem<'a> {
    pub name: &'a str,
    pub base_unit: BaseUnit,
    /// Price per one unit of `base_unit`
    pub unit_price: f64,
}

/// Id-keyed inventory snapshot
///
/// Built fresh by the caller for each computation; cheap to construct and
/// never mutated by the calculator.
#[derive(Debug, Default)]
pub struct InventoryLookup<'a> {
    items: HashMap<i64, PricedItem<'a>>,
}

impl<'a> InventoryLookup<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, id: i64, item: PricedItem<'a>) {
        self.items.insert(id, item);
    }

    pub fn get(&self, id: i64) -> Option<&PricedItem<'a>> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> FromIterator<(i64, PricedItem<'a>)> for InventoryLookup<'a> {
    fn from_iter<T: IntoIterator<Item = (i64, PricedItem<'a>)>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Compute the total cost of an ingredient list
///
/// Pure and total: every line contributes `unit_price * quantity_in_base`, or
/// zero when the line cannot be costed. Lines are skipped (never an error)
/// when the item reference dangles, the price or quantity is non-positive, or
/// the units are incompatible; the incompatible case additionally logs a
/// warning, since it signals a data-entry anomaly rather than a transiently
/// empty draft row.
pub fn compute_cost(lines: &[IngredientLine], lookup: &InventoryLookup) -> f64 {
    let mut total = 0.0;

    for line in lines {
        let Some(item) = lookup.get(line.item_id) else {
            continue;
        };
        if item.unit_price <= 0.0 || line.quantity <= 0.0 {
            continue;
        }
        match to_base_factor(item.base_unit, line.unit) {
            Some(factor) => total += item.unit_price * line.quantity * factor,
            None => {
                tracing::warn!(
                    "incompatible units for {}: {} used in recipe, priced per {}",
                    item.name,
                    line.unit.as_str(),
                    item.base_unit.as_str()
                );
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> InventoryLookup<'static> {
        let mut lookup = InventoryLookup::new();
        lookup.insert(
            1,
            PricedItem {
                name: "Harina 0000",
                base_unit: BaseUnit::MassKg,
                unit_price: 1.50,
            },
        );
        lookup.insert(
            2,
            PricedItem {
                name: "Huevos",
                base_unit: BaseUnit::Count,
                unit_price: 0.20,
            },
        );
        lookup.insert(
            3,
            PricedItem {
                name: "Leche Entera",
                base_unit: BaseUnit::VolumeL,
                unit_price: 1.10,
            },
        );
        lookup.insert(
            4,
            PricedItem {
                name: "Azucar",
                base_unit: BaseUnit::MassKg,
                unit_price: 1.80,
            },
        );
        lookup
    }

    fn line(item_id: i64, quantity: f64, unit: IngredientUnit) -> IngredientLine {
        IngredientLine {
            item_id,
            quantity,
            unit,
        }
    }

    #[test]
    fn test_empty_list_costs_zero() {
        assert_eq!(compute_cost(&[], &lookup()), 0.0);
        assert_eq!(compute_cost(&[], &InventoryLookup::new()), 0.0);
    }

    #[test]
    fn test_same_scale_unit() {
        // 0.5 kg of flour at 1.50/kg
        let cost = compute_cost(&[line(1, 0.5, IngredientUnit::Kilogram)], &lookup());
        assert!((cost - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_small_unit_converts() {
        // 500 g of flour equals 0.5 kg
        let grams = compute_cost(&[line(1, 500.0, IngredientUnit::Gram)], &lookup());
        let kilos = compute_cost(&[line(1, 0.5, IngredientUnit::Kilogram)], &lookup());
        assert!((grams - 0.75).abs() < 1e-9);
        assert!((grams - kilos).abs() < 1e-9);

        // 250 ml of milk at 1.10/l
        let ml = compute_cost(&[line(3, 250.0, IngredientUnit::Milliliter)], &lookup());
        assert!((ml - 0.275).abs() < 1e-9);
    }

    #[test]
    fn test_dangling_reference_contributes_zero() {
        let lines = [
            line(99, 2.0, IngredientUnit::Kilogram),
            line(1, 0.5, IngredientUnit::Kilogram),
        ];
        let cost = compute_cost(&lines, &lookup());
        assert!((cost - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_units_contribute_zero() {
        // mass unit against a volume-priced item
        let cost = compute_cost(&[line(3, 100.0, IngredientUnit::Gram)], &lookup());
        assert_eq!(cost, 0.0);

        // count against a mass-priced item
        let cost = compute_cost(&[line(1, 3.0, IngredientUnit::Count)], &lookup());
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_non_positive_guards() {
        let mut lookup = lookup();
        lookup.insert(
            5,
            PricedItem {
                name: "Placeholder",
                base_unit: BaseUnit::MassKg,
                unit_price: 0.0,
            },
        );

        // zero price
        assert_eq!(
            compute_cost(&[line(5, 2.0, IngredientUnit::Kilogram)], &lookup),
            0.0
        );
        // zero and negative quantity
        assert_eq!(
            compute_cost(&[line(1, 0.0, IngredientUnit::Kilogram)], &lookup),
            0.0
        );
        assert_eq!(
            compute_cost(&[line(1, -1.0, IngredientUnit::Kilogram)], &lookup),
            0.0
        );
    }

    #[test]
    fn test_additivity() {
        let a = [
            line(1, 0.5, IngredientUnit::Kilogram),
            line(2, 4.0, IngredientUnit::Count),
        ];
        let b = [
            line(3, 250.0, IngredientUnit::Milliliter),
            line(4, 0.25, IngredientUnit::Kilogram),
        ];
        let combined: Vec<_> = a.iter().chain(b.iter()).copied().collect();

        let lookup = lookup();
        let sum = compute_cost(&a, &lookup) + compute_cost(&b, &lookup);
        assert!((compute_cost(&combined, &lookup) - sum).abs() < 1e-9);
    }

    #[test]
    fn test_basic_sponge_cake_total() {
        // 0.5 kg flour + 4 eggs + 0.25 kg sugar = 0.75 + 0.80 + 0.45
        let lines = [
            line(1, 0.5, IngredientUnit::Kilogram),
            line(2, 4.0, IngredientUnit::Count),
            line(4, 0.25, IngredientUnit::Kilogram),
        ];
        let cost = compute_cost(&lines, &lookup());
        assert!((cost - 2.00).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let lines = [
            line(1, 0.5, IngredientUnit::Kilogram),
            line(2, 4.0, IngredientUnit::Count),
            line(99, 1.0, IngredientUnit::Count),
        ];
        let lookup = lookup();
        let first = compute_cost(&lines, &lookup);
        for _ in 0..10 {
            assert_eq!(compute_cost(&lines, &lookup), first);
        }
    }
}

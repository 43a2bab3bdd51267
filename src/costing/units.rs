//! Unit types and conversion constants
//!
//! Provides the closed unit sets for inventory costing and recipe ingredients,
//! plus the compatibility table between them.

use serde::{Deserialize, Serialize};

/// Kilogram-equivalents per gram
pub const KG_PER_GRAM: f64 = 0.001;
/// Liter-equivalents per milliliter
pub const LITERS_PER_ML: f64 = 0.001;

/// Base costing unit for an inventory item's stock and price
///
/// `quantity_on_hand` and `unit_price` are always denominated in this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseUnit {
    /// Priced per kilogram (solids, powders)
    #[serde(rename = "kg")]
    MassKg,
    /// Priced per liter (liquids)
    #[serde(rename = "l")]
    VolumeL,
    /// Priced per piece (eggs, trays)
    Count,
}

impl BaseUnit {
    /// Get the canonical unit string
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseUnit::MassKg => "kg",
            BaseUnit::VolumeL => "l",
            BaseUnit::Count => "count",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.trim() {
            "kg" | "kilogram" | "kilograms" => Some(BaseUnit::MassKg),
            "l" | "liter" | "liters" | "litre" | "litres" => Some(BaseUnit::VolumeL),
            "count" | "unit" | "units" | "each" | "piece" | "pieces" => Some(BaseUnit::Count),
            _ => None,
        }
    }

    /// Convert to database string
    pub fn to_db_str(&self) -> &'static str {
        self.as_str()
    }
}

/// Unit in which a recipe ingredient's quantity is expressed
///
/// May differ in scale (never in family) from the referenced item's base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientUnit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "l")]
    Liter,
    Count,
}

impl IngredientUnit {
    /// Get the canonical unit string
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientUnit::Gram => "g",
            IngredientUnit::Kilogram => "kg",
            IngredientUnit::Milliliter => "ml",
            IngredientUnit::Liter => "l",
            IngredientUnit::Count => "count",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.trim() {
            "g" | "gram" | "grams" => Some(IngredientUnit::Gram),
            "kg" | "kilogram" | "kilograms" => Some(IngredientUnit::Kilogram),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(IngredientUnit::Milliliter)
            }
            "l" | "liter" | "liters" | "litre" | "litres" => Some(IngredientUnit::Liter),
            "count" | "unit" | "units" | "each" | "piece" | "pieces" => Some(IngredientUnit::Count),
            _ => None,
        }
    }

    /// Convert to database string
    pub fn to_db_str(&self) -> &'static str {
        self.as_str()
    }
}

/// Recipe units compatible with a base costing unit
///
/// Total and never empty. Ordered with the small-scale unit first, which is
/// the default selection when an ingredient's item changes.
pub fn compatible_units(base: BaseUnit) -> &'static [IngredientUnit] {
    match base {
        BaseUnit::MassKg => &[IngredientUnit::Gram, IngredientUnit::Kilogram],
        BaseUnit::VolumeL => &[IngredientUnit::Milliliter, IngredientUnit::Liter],
        BaseUnit::Count => &[IngredientUnit::Count],
    }
}

/// Default ingredient unit for a base unit (first compatible)
pub fn default_unit(base: BaseUnit) -> IngredientUnit {
    compatible_units(base)[0]
}

/// Scale factor converting a quantity in `unit` into `base`-equivalents
///
/// Returns `None` when the units belong to different families (mass vs volume
/// vs count). `Some` is guaranteed exactly for `unit` in
/// [`compatible_units`]`(base)`.
pub fn to_base_factor(base: BaseUnit, unit: IngredientUnit) -> Option<f64> {
    match (base, unit) {
        (BaseUnit::MassKg, IngredientUnit::Kilogram) => Some(1.0),
        (BaseUnit::MassKg, IngredientUnit::Gram) => Some(KG_PER_GRAM),
        (BaseUnit::VolumeL, IngredientUnit::Liter) => Some(1.0),
        (BaseUnit::VolumeL, IngredientUnit::Milliliter) => Some(LITERS_PER_ML),
        (BaseUnit::Count, IngredientUnit::Count) => Some(1.0),
        _ => None,
    }
}

/// Whether `unit` can be converted into `base`
pub fn is_compatible(base: BaseUnit, unit: IngredientUnit) -> bool {
    to_base_factor(base, unit).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatible_units_nonempty_and_default() {
        for base in [BaseUnit::MassKg, BaseUnit::VolumeL, BaseUnit::Count] {
            let units = compatible_units(base);
            assert!(!units.is_empty());
            assert_eq!(default_unit(base), units[0]);
        }
        assert_eq!(default_unit(BaseUnit::MassKg), IngredientUnit::Gram);
        assert_eq!(default_unit(BaseUnit::VolumeL), IngredientUnit::Milliliter);
        assert_eq!(default_unit(BaseUnit::Count), IngredientUnit::Count);
    }

    #[test]
    fn test_identity_factors() {
        assert_eq!(
            to_base_factor(BaseUnit::MassKg, IngredientUnit::Kilogram),
            Some(1.0)
        );
        assert_eq!(
            to_base_factor(BaseUnit::VolumeL, IngredientUnit::Liter),
            Some(1.0)
        );
        assert_eq!(
            to_base_factor(BaseUnit::Count, IngredientUnit::Count),
            Some(1.0)
        );
    }

    #[test]
    fn test_small_unit_factors() {
        assert_eq!(
            to_base_factor(BaseUnit::MassKg, IngredientUnit::Gram),
            Some(0.001)
        );
        assert_eq!(
            to_base_factor(BaseUnit::VolumeL, IngredientUnit::Milliliter),
            Some(0.001)
        );
    }

    #[test]
    fn test_incompatible_pairs() {
        assert_eq!(to_base_factor(BaseUnit::MassKg, IngredientUnit::Milliliter), None);
        assert_eq!(to_base_factor(BaseUnit::MassKg, IngredientUnit::Count), None);
        assert_eq!(to_base_factor(BaseUnit::VolumeL, IngredientUnit::Gram), None);
        assert_eq!(to_base_factor(BaseUnit::Count, IngredientUnit::Kilogram), None);
        assert!(!is_compatible(BaseUnit::Count, IngredientUnit::Liter));
    }

    #[test]
    fn test_factor_defined_exactly_for_compatible() {
        let all_bases = [BaseUnit::MassKg, BaseUnit::VolumeL, BaseUnit::Count];
        let all_units = [
            IngredientUnit::Gram,
            IngredientUnit::Kilogram,
            IngredientUnit::Milliliter,
            IngredientUnit::Liter,
            IngredientUnit::Count,
        ];
        for base in all_bases {
            for unit in all_units {
                let listed = compatible_units(base).contains(&unit);
                assert_eq!(to_base_factor(base, unit).is_some(), listed);
            }
        }
    }

    #[test]
    fn test_base_unit_from_str() {
        assert_eq!(BaseUnit::from_str("kg"), Some(BaseUnit::MassKg));
        assert_eq!(BaseUnit::from_str("Kilogram"), Some(BaseUnit::MassKg));
        assert_eq!(BaseUnit::from_str("l"), Some(BaseUnit::VolumeL));
        assert_eq!(BaseUnit::from_str("litre"), Some(BaseUnit::VolumeL));
        assert_eq!(BaseUnit::from_str("count"), Some(BaseUnit::Count));
        assert_eq!(BaseUnit::from_str("unit"), Some(BaseUnit::Count));
        assert_eq!(BaseUnit::from_str("tbsp"), None);
    }

    #[test]
    fn test_ingredient_unit_from_str() {
        assert_eq!(IngredientUnit::from_str("g"), Some(IngredientUnit::Gram));
        assert_eq!(IngredientUnit::from_str("grams"), Some(IngredientUnit::Gram));
        assert_eq!(IngredientUnit::from_str("ML"), Some(IngredientUnit::Milliliter));
        assert_eq!(IngredientUnit::from_str("each"), Some(IngredientUnit::Count));
        assert_eq!(IngredientUnit::from_str("cup"), None);
    }

    #[test]
    fn test_db_round_trip() {
        for unit in [
            IngredientUnit::Gram,
            IngredientUnit::Kilogram,
            IngredientUnit::Milliliter,
            IngredientUnit::Liter,
            IngredientUnit::Count,
        ] {
            assert_eq!(IngredientUnit::from_str(unit.to_db_str()), Some(unit));
        }
        for base in [BaseUnit::MassKg, BaseUnit::VolumeL, BaseUnit::Count] {
            assert_eq!(BaseUnit::from_str(base.to_db_str()), Some(base));
        }
    }
}

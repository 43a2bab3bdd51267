//! Utility to seed the database with demonstration data
//!
//! Loads a small pantry and one recipe so the tool surface can be exercised
//! on a fresh install. Skips seeding when the database already has items.

use std::path::PathBuf;

use larder::costing::{BaseUnit, IngredientLine, IngredientUnit};
use larder::models::{InventoryItem, InventoryItemCreate, Recipe, RecipeCreate, RecipeIngredient};

fn get_database_path() -> PathBuf {
    std::env::var("LARDER_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("larder.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = larder::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        larder::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let existing = database.with_conn(|conn| InventoryItem::count(conn))?;
    if existing > 0 {
        println!("Database already has {} inventory items; not seeding.", existing);
        return Ok(());
    }

    let items = [
        ("Harina 0000", BaseUnit::MassKg, 5.0, 1.50),
        ("Huevos", BaseUnit::Count, 24.0, 0.20),
        ("Leche Entera", BaseUnit::VolumeL, 6.0, 1.10),
        ("Azucar", BaseUnit::MassKg, 2.0, 1.80),
        ("Chocolate Cobertura", BaseUnit::MassKg, 1.0, 15.00),
    ];

    let mut item_ids = Vec::new();
    for (name, base_unit, quantity, price) in items {
        let item = database.with_conn(|conn| {
            InventoryItem::create(
                conn,
                &InventoryItemCreate {
                    name: name.to_string(),
                    base_unit,
                    quantity_on_hand: quantity,
                    unit_price: price,
                    notes: None,
                },
            )
        })?;
        println!(
            "Seeded item {}: {} ({} {} at {}/{})",
            item.id,
            item.name,
            item.quantity_on_hand,
            item.base_unit.as_str(),
            item.unit_price,
            item.base_unit.as_str()
        );
        item_ids.push(item.id);
    }

    // Basic sponge cake: 0.5 kg flour, 4 eggs, 0.25 kg sugar
    let recipe = database.with_conn(|conn| {
        Recipe::create(
            conn,
            &RecipeCreate {
                name: "Bizcochuelo Basico".to_string(),
                notes: None,
            },
        )
    })?;

    let lines = vec![
        IngredientLine {
            item_id: item_ids[0],
            quantity: 0.5,
            unit: IngredientUnit::Kilogram,
        },
        IngredientLine {
            item_id: item_ids[1],
            quantity: 4.0,
            unit: IngredientUnit::Count,
        },
        IngredientLine {
            item_id: item_ids[3],
            quantity: 0.25,
            unit: IngredientUnit::Kilogram,
        },
    ];

    database.with_conn_mut(|conn| RecipeIngredient::replace_for_recipe(conn, recipe.id, &lines))?;

    let cost = database.with_conn(|conn| larder::models::recipe_cost(conn, recipe.id))?;
    println!("Seeded recipe {}: {} (cost {:.2})", recipe.id, recipe.name, cost);

    Ok(())
}

//! Price MCP Tools
//!
//! Bulk price updates, including suggestions extracted from a scanned
//! supplier price list.

use serde::Serialize;

use crate::db::Database;
use crate::models::{InventoryItem, PriceUpdate};
use crate::pricing::{self, ItemDigest};

/// A suggested price change, joined against current inventory
#[derive(Debug, Serialize)]
pub struct PriceSuggestion {
    pub item_id: i64,
    pub item_name: String,
    pub previous_price: f64,
    pub new_price: f64,
}

/// Response for extract_price_suggestions
#[derive(Debug, Serialize)]
pub struct ExtractPricesResponse {
    pub suggestions: Vec<PriceSuggestion>,
    pub count: usize,
    /// Extracted entries referencing items that no longer exist
    pub ignored: usize,
}

/// Response for apply_price_updates
#[derive(Debug, Serialize)]
pub struct ApplyPriceUpdatesResponse {
    pub updated: i64,
    pub requested: usize,
}

/// Extract price-update suggestions from a PDF price list
///
/// Reads the PDF, sends it with an inventory digest to the extraction API,
/// and joins the results back against the current items. Nothing is written;
/// apply_price_updates commits a reviewed set of changes.
pub fn extract_price_suggestions(
    db: &Database,
    pdf_path: &str,
) -> Result<ExtractPricesResponse, String> {
    let pdf_data = std::fs::read(pdf_path)
        .map_err(|e| format!("Failed to read PDF {}: {}", pdf_path, e))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = InventoryItem::get_all(&conn)
        .map_err(|e| format!("Failed to load inventory: {}", e))?;

    if items.is_empty() {
        return Err("Inventory is empty; nothing to match prices against".to_string());
    }

    let digests: Vec<ItemDigest> = items
        .iter()
        .map(|item| ItemDigest {
            id: item.id,
            name: item.name.clone(),
        })
        .collect();

    let extracted = pricing::extract_prices(&pdf_data, &digests)
        .map_err(|e| format!("Price extraction failed: {}", e))?;

    let mut suggestions = Vec::new();
    let mut ignored = 0;

    for price in &extracted {
        match items.iter().find(|item| item.id == price.item_id) {
            Some(item) => suggestions.push(PriceSuggestion {
                item_id: item.id,
                item_name: item.name.clone(),
                previous_price: item.unit_price,
                new_price: price.new_price,
            }),
            None => {
                tracing::warn!(
                    "extraction returned unknown item id {}; ignoring",
                    price.item_id
                );
                ignored += 1;
            }
        }
    }

    let count = suggestions.len();

    Ok(ExtractPricesResponse {
        suggestions,
        count,
        ignored,
    })
}

/// Apply a reviewed set of price updates in one transaction
pub fn apply_price_updates(
    db: &Database,
    updates: Vec<PriceUpdate>,
) -> Result<ApplyPriceUpdatesResponse, String> {
    if updates.is_empty() {
        return Err("No price updates provided".to_string());
    }
    if let Some(bad) = updates.iter().find(|u| u.new_price < 0.0) {
        return Err(format!(
            "new_price cannot be negative (item {})",
            bad.item_id
        ));
    }

    let requested = updates.len();

    let updated = db
        .with_conn_mut(|conn| InventoryItem::batch_update_prices(conn, &updates))
        .map_err(|e| format!("Failed to apply price updates: {}", e))?;

    Ok(ApplyPriceUpdatesResponse { updated, requested })
}

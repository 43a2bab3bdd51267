//! Pricing module
//!
//! Bulk price updates sourced from scanned supplier price lists, extracted
//! through an external AI text-extraction call.

pub mod extractor;

use thiserror::Error;

pub use extractor::{extract_prices, ExtractedPrice, ItemDigest, API_KEY_ENV};

/// Price extraction error types
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("API key not configured; set {}", API_KEY_ENV)]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid extraction response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

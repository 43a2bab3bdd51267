//! Price-list extraction via the Gemini API
//!
//! Sends a supplier's PDF price list together with a digest of the current
//! inventory and asks the model to match products and return updated unit
//! prices as structured JSON.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::PricingError;

/// Model used for extraction
const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "LARDER_GEMINI_API_KEY";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Inventory digest entry sent to the model for name matching
#[derive(Debug, Clone, Serialize)]
pub struct ItemDigest {
    pub id: i64,
    pub name: String,
}

/// One extracted price, keyed by inventory item ID
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ExtractedPrice {
    pub item_id: i64,
    pub new_price: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Extract updated prices for known inventory items from a PDF price list
///
/// Blocking call; the caller decides where it may run. Items the model cannot
/// match are simply absent from the result.
pub fn extract_prices(
    pdf_data: &[u8],
    inventory: &[ItemDigest],
) -> Result<Vec<ExtractedPrice>, PricingError> {
    let api_key = std::env::var(API_KEY_ENV).map_err(|_| PricingError::MissingApiKey)?;

    let encoded_pdf = base64::engine::general_purpose::STANDARD.encode(pdf_data);
    let body = build_request_body(&encoded_pdf, inventory)?;

    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        GEMINI_MODEL, api_key
    );

    tracing::info!(
        "requesting price extraction for {} inventory items ({} byte PDF)",
        inventory.len(),
        pdf_data.len()
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let response = client.post(&url).json(&body).send()?;

    if !response.status().is_success() {
        let status = response.status();
        let detail = response.text().unwrap_or_default();
        return Err(PricingError::InvalidResponse(format!(
            "extraction API returned {}: {}",
            status, detail
        )));
    }

    let parsed: GenerateContentResponse = response.json()?;
    let text = parsed
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_str())
        .ok_or_else(|| {
            PricingError::InvalidResponse("extraction API returned no candidates".to_string())
        })?;

    parse_extraction_text(text)
}

/// Build the generateContent request body
fn build_request_body(
    encoded_pdf: &str,
    inventory: &[ItemDigest],
) -> Result<serde_json::Value, PricingError> {
    let inventory_json = serde_json::to_string(inventory)?;

    let prompt = format!(
        "Analyze the attached PDF, which is a supplier price list. Then review \
         the inventory items provided below as JSON. Identify the inventory \
         items that appear in the PDF and extract their new unit price. Be \
         precise when matching names, ignoring small variations. Return only \
         the items for which you find an updated price.\n\n\
         Current inventory:\n{}",
        inventory_json
    );

    Ok(json!({
        "contents": [{
            "parts": [
                { "text": prompt },
                {
                    "inline_data": {
                        "mime_type": "application/pdf",
                        "data": encoded_pdf,
                    }
                }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "item_id": {
                            "type": "INTEGER",
                            "description": "ID of the inventory item to update",
                        },
                        "new_price": {
                            "type": "NUMBER",
                            "description": "New unit price extracted from the PDF",
                        },
                    },
                    "required": ["item_id", "new_price"],
                },
            },
        },
    }))
}

/// Parse the model's JSON text into extracted prices
fn parse_extraction_text(text: &str) -> Result<Vec<ExtractedPrice>, PricingError> {
    let prices: Vec<ExtractedPrice> = serde_json::from_str(text.trim())?;
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extraction_text() {
        let text = r#"[
            {"item_id": 1, "new_price": 1.75},
            {"item_id": 4, "new_price": 2.10}
        ]"#;
        let prices = parse_extraction_text(text).unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0], ExtractedPrice { item_id: 1, new_price: 1.75 });
        assert_eq!(prices[1].item_id, 4);
    }

    #[test]
    fn test_parse_extraction_text_empty() {
        assert!(parse_extraction_text("[]").unwrap().is_empty());
        assert!(parse_extraction_text("  []  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_extraction_text_malformed() {
        assert!(parse_extraction_text("not json").is_err());
        assert!(parse_extraction_text(r#"{"item_id": 1}"#).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let inventory = vec![ItemDigest { id: 1, name: "Harina 0000".to_string() }];
        let body = build_request_body("cGRm", &inventory).unwrap();

        assert_eq!(
            body["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "application/pdf"
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Harina 0000"));
    }
}

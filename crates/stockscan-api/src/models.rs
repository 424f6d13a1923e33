// Wire types for the inventory REST API.
//
// The server is backed by a spreadsheet, so identifiers and quantities
// arrive as either JSON strings or numbers. The lenient deserializers
// below normalize both into one Rust type per field.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Barcode slot ────────────────────────────────────────────────────

/// `GET /api/get-latest-barcode`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LatestBarcode {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub barcode: Option<String>,
}

/// `POST /api/nullify-barcode` request body.
#[derive(Debug, Clone, Serialize)]
pub struct NullifyRequest<'a> {
    pub barcode: &'a str,
}

/// Generic `{ message }` acknowledgement returned by several endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// ── Inventory ───────────────────────────────────────────────────────

/// One row of `GET /api/inventory`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,
    /// Movements recorded for the product today.
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub daily_transactions: i64,
}

/// `POST /api/inventory` request body (add or overwrite one product).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsert {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
}

// ── Movements ───────────────────────────────────────────────────────

/// Transaction type as the server spells it on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(alias = "Entrée")]
    Entree,
    Sortie,
}

/// One element of the bulk body sent to `update-inventory` and `update-log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementUpdate {
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub product: String,
    pub quantity: u32,
}

/// One row of `GET /api/transaction-log`.
///
/// `kind` stays a raw string: historic rows carry spellings the bulk
/// endpoints no longer accept, and the header row of the backing sheet
/// comes through as data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransactionEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(deserialize_with = "string_or_number")]
    pub product: String,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// ── Lenient deserializers ───────────────────────────────────────────

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s.trim().to_owned()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string, a number or null, got {other}"
        ))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn lenient_quantity<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| de::Error::custom(format!("quantity out of range: {n}"))),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            // Header rows of the backing sheet carry a label here.
            Ok(s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f.round() as i64))
                .unwrap_or(0))
        }
        other => Err(de::Error::custom(format!("invalid quantity: {other}"))),
    }
}

// ── Transaction log entries ──

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use stockscan_api::TransactionEntry;
use strum::{Display, EnumString};
use tracing::debug;

/// Product value carried by the header row of the log sheet.
const HEADER_PRODUCT: &str = "Produit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TransactionType {
    #[strum(to_string = "Entree", serialize = "Entrée")]
    Entree,
    Sortie,
}

/// One movement recorded in the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionType,
    pub product: String,
    pub quantity: i64,
    /// Parsed timestamp in local time, when the log value is readable.
    pub timestamp: Option<NaiveDateTime>,
    /// The timestamp exactly as the server sent it.
    pub raw_timestamp: Option<String>,
}

impl Transaction {
    /// Convert a wire entry, dropping the sheet header row and rows whose
    /// type is neither an entry nor an exit.
    pub fn from_entry(entry: TransactionEntry) -> Option<Self> {
        if entry.product == HEADER_PRODUCT {
            return None;
        }
        let Ok(kind) = entry.kind.trim().parse::<TransactionType>() else {
            debug!(kind = %entry.kind, product = %entry.product, "skipping log row with unknown type");
            return None;
        };
        let timestamp = entry.timestamp.as_deref().and_then(parse_timestamp);
        Some(Self {
            kind,
            product: entry.product,
            quantity: entry.quantity,
            timestamp,
            raw_timestamp: entry.timestamp,
        })
    }

    /// Calendar day of the transaction, if its timestamp parsed.
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }
}

/// Convert a batch of wire entries, preserving order.
pub fn from_entries(entries: impl IntoIterator<Item = TransactionEntry>) -> Vec<Transaction> {
    entries.into_iter().filter_map(Transaction::from_entry).collect()
}

/// Parse the timestamp spellings found in the log sheet.
///
/// Offsets are converted to local time; naive values are taken as local.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];

    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            ["%Y-%m-%d", "%d/%m/%Y"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

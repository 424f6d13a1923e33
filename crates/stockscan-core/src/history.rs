// ── Transaction history ──

use std::cmp::Reverse;

use stockscan_api::InventoryClient;

use crate::error::CoreError;
use crate::model::transaction::{self, Transaction, TransactionType};

/// Fetch the transaction log without its header row.
pub async fn fetch_transactions(client: &InventoryClient) -> Result<Vec<Transaction>, CoreError> {
    Ok(transaction::from_entries(client.transaction_log().await?))
}

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub kind: Option<TransactionType>,
    pub limit: Option<usize>,
}

/// Newest first, filtered and truncated.
///
/// The log is append-only, so rows with equal or unreadable timestamps
/// keep reverse log order; unreadable ones sort last.
pub fn select(mut transactions: Vec<Transaction>, filter: &HistoryFilter) -> Vec<Transaction> {
    transactions.reverse();
    transactions.sort_by_key(|t| (t.timestamp.is_none(), Reverse(t.timestamp)));

    let rows = transactions
        .into_iter()
        .filter(|t| filter.kind.is_none_or(|kind| t.kind == kind));
    match filter.limit {
        Some(limit) => rows.take(limit).collect(),
        None => rows.collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::transaction::parse_timestamp;

    fn tx(kind: TransactionType, product: &str, ts: Option<&str>) -> Transaction {
        Transaction {
            kind,
            product: product.into(),
            quantity: 1,
            timestamp: ts.and_then(parse_timestamp),
            raw_timestamp: ts.map(Into::into),
        }
    }

    #[test]
    fn newest_first_with_undated_rows_last() {
        let log = vec![
            tx(TransactionType::Entree, "old", Some("2026-01-01 08:00:00")),
            tx(TransactionType::Sortie, "undated", None),
            tx(TransactionType::Entree, "new", Some("2026-02-01 08:00:00")),
            tx(TransactionType::Sortie, "same-a", Some("2026-01-15 08:00:00")),
            tx(TransactionType::Sortie, "same-b", Some("2026-01-15 08:00:00")),
        ];
        let products: Vec<_> = select(log, &HistoryFilter::default())
            .into_iter()
            .map(|t| t.product)
            .collect();
        assert_eq!(products, ["new", "same-b", "same-a", "old", "undated"]);
    }

    #[test]
    fn filters_by_type_then_limits() {
        let log = vec![
            tx(TransactionType::Entree, "a", Some("2026-01-01")),
            tx(TransactionType::Sortie, "b", Some("2026-01-02")),
            tx(TransactionType::Entree, "c", Some("2026-01-03")),
            tx(TransactionType::Entree, "d", Some("2026-01-04")),
        ];
        let filter = HistoryFilter {
            kind: Some(TransactionType::Entree),
            limit: Some(2),
        };
        let products: Vec<_> = select(log, &filter).into_iter().map(|t| t.product).collect();
        assert_eq!(products, ["d", "c"]);
    }
}

// ── Movement statistics ──
//
// Aggregates over the transaction log: total quantities in and out,
// transaction counts per type, and the most active products.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Transaction, TransactionType};

/// Number of products listed in [`MovementStats::top_products`].
pub const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub product: Option<String>,
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl StatsFilter {
    /// Whether `t` falls inside the filter. With a date bound set, rows
    /// whose timestamp could not be read are excluded.
    pub fn matches(&self, t: &Transaction) -> bool {
        if self.product.as_deref().is_some_and(|p| p != t.product) {
            return false;
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(day) = t.date() else {
            return false;
        };
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductActivity {
    pub product: String,
    pub transactions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovementStats {
    /// Sum of entry quantities.
    pub total_entries: i64,
    /// Sum of exit quantities.
    pub total_exits: i64,
    pub entry_count: usize,
    pub exit_count: usize,
    /// Products by number of transactions, most active first. Ties keep
    /// first-appearance order.
    pub top_products: Vec<ProductActivity>,
}

impl MovementStats {
    pub fn compute(transactions: &[Transaction], filter: &StatsFilter) -> Self {
        let mut stats = Self::default();
        let mut activity: IndexMap<&str, usize> = IndexMap::new();

        for t in transactions.iter().filter(|t| filter.matches(t)) {
            match t.kind {
                TransactionType::Entree => {
                    stats.total_entries += t.quantity;
                    stats.entry_count += 1;
                }
                TransactionType::Sortie => {
                    stats.total_exits += t.quantity;
                    stats.exit_count += 1;
                }
            }
            *activity.entry(t.product.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<_> = activity.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        stats.top_products = ranked
            .into_iter()
            .take(TOP_PRODUCTS)
            .map(|(product, transactions)| ProductActivity {
                product: product.to_owned(),
                transactions,
            })
            .collect();
        stats
    }
}

/// Distinct products in log order.
pub fn products(transactions: &[Transaction]) -> Vec<String> {
    let mut seen: IndexMap<&str, ()> = IndexMap::new();
    for t in transactions {
        seen.insert(t.product.as_str(), ());
    }
    seen.into_keys().map(str::to_owned).collect()
}

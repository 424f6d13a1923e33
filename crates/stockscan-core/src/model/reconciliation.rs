// ── Stock reconciliation ──

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, fallback_name};
use crate::accumulator::BucketLine;

/// Inventory stock next to the physically counted quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub product_id: String,
    pub display_name: String,
    pub inventory_stock: i64,
    pub validated_count: u32,
    /// `inventory_stock - validated_count`
    pub difference: i64,
}

/// One row per catalog product, in catalog order, with the counted
/// quantity from `validated` (zero when the product was never scanned).
///
/// Counted products missing from `catalog` (dropped by a refresh since
/// they were scanned) are appended with a stock of zero.
pub fn reconcile(catalog: &Catalog, validated: &[BucketLine]) -> Vec<ReconciliationRow> {
    let count_of = |id: &str| {
        validated
            .iter()
            .find(|line| line.product_id == id)
            .map_or(0, |line| line.count)
    };

    let mut rows: Vec<ReconciliationRow> = catalog
        .iter()
        .map(|product| {
            row(
                &product.product_id,
                &product.display_name,
                product.stock,
                count_of(&product.product_id),
            )
        })
        .collect();

    rows.extend(
        validated
            .iter()
            .filter(|line| !catalog.contains(&line.product_id))
            .map(|line| row(&line.product_id, &fallback_name(&line.product_id), 0, line.count)),
    );
    rows
}

fn row(product_id: &str, display_name: &str, stock: i64, count: u32) -> ReconciliationRow {
    ReconciliationRow {
        product_id: product_id.to_owned(),
        display_name: display_name.to_owned(),
        inventory_stock: stock,
        validated_count: count,
        difference: stock - i64::from(count),
    }
}

// ── Product catalog ──
//
// The set of product IDs a scan may resolve to, built from the inventory
// listing. The backing sheet's header row comes through as a product and
// is filtered out here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stockscan_api::InventoryItem;

use crate::error::CoreError;

/// Product IDs that are really the header row of the inventory sheet.
const HEADER_SENTINELS: &[&str] = &["ProductID", "ID Produit"];

/// One known product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub display_name: String,
    /// Quantity currently recorded in the inventory.
    pub stock: i64,
    #[serde(default)]
    pub daily_transactions: i64,
}

/// Fallback name for a product the inventory lists without one.
pub fn fallback_name(product_id: &str) -> String {
    format!("Produit {product_id}")
}

/// Immutable catalog snapshot, in inventory order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: IndexMap<String, Product>,
}

impl Catalog {
    /// Build from the raw inventory listing.
    ///
    /// Blank IDs and header sentinels are dropped. If an ID appears twice
    /// the later row wins but keeps the earlier position.
    pub fn from_inventory(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let mut products = IndexMap::new();
        for item in items {
            let product_id = item.product_id.trim();
            if product_id.is_empty() || HEADER_SENTINELS.contains(&product_id) {
                continue;
            }
            let display_name = item
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map_or_else(|| fallback_name(product_id), str::to_owned);

            products.insert(
                product_id.to_owned(),
                Product {
                    product_id: product_id.to_owned(),
                    display_name,
                    stock: item.quantity,
                    daily_transactions: item.daily_transactions,
                },
            );
        }
        Self { products }
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Look up a scanned code, failing with [`CoreError::UnknownProduct`].
    pub fn require(&self, code: &str) -> Result<&Product, CoreError> {
        self.products
            .get(code)
            .ok_or_else(|| CoreError::UnknownProduct {
                code: code.to_owned(),
            })
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.contains_key(product_id)
    }

    /// Display name, falling back to `Produit {id}` for unknown IDs.
    pub fn display_name(&self, product_id: &str) -> String {
        self.products
            .get(product_id)
            .map_or_else(|| fallback_name(product_id), |p| p.display_name.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self {
            products: iter
                .into_iter()
                .map(|p| (p.product_id.clone(), p))
                .collect(),
        }
    }
}

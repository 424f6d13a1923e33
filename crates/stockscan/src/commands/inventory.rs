//! Inventory command handlers.

use tabled::Tabled;

use stockscan_api::{InventoryClient, ProductUpsert};
use stockscan_core::{Catalog, Product};

use crate::cli::{GlobalOpts, InventoryArgs, InventoryCommand, InventorySort};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Stock")]
    stock: i64,
    #[tabled(rename = "Today")]
    daily: i64,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.product_id.clone(),
            name: p.display_name.clone(),
            stock: p.stock,
            daily: p.daily_transactions,
        }
    }
}

fn matches_filter(p: &Product, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    p.product_id.to_lowercase().contains(&needle) || p.display_name.to_lowercase().contains(&needle)
}

/// Stable sort, so equal keys keep inventory order.
fn sort_products(products: &mut [Product], by: InventorySort) {
    match by {
        InventorySort::Id => products.sort_by(|a, b| a.product_id.cmp(&b.product_id)),
        InventorySort::Name => products.sort_by_key(|p| p.display_name.to_lowercase()),
        InventorySort::Stock => products.sort_by_key(|p| p.stock),
        InventorySort::Daily => products.sort_by_key(|p| p.daily_transactions),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &InventoryClient,
    args: InventoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InventoryCommand::List {
            filter,
            sort,
            reverse,
        } => {
            let catalog = Catalog::from_inventory(client.list_inventory().await?);
            let mut products: Vec<Product> = catalog
                .iter()
                .filter(|p| filter.as_deref().is_none_or(|f| matches_filter(p, f)))
                .cloned()
                .collect();
            if let Some(by) = sort {
                sort_products(&mut products, by);
            }
            if reverse {
                products.reverse();
            }

            let out = output::render_list(
                &global.output,
                &products,
                |p| ProductRow::from(p),
                |p| p.product_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InventoryCommand::Set { id, name, quantity } => {
            let product = ProductUpsert {
                product_id: util::require_non_empty("id", &id)?,
                name: util::require_non_empty("name", &name)?,
                quantity: non_negative(quantity)?,
            };
            client.upsert_product(&product).await?;
            util::note(
                global,
                &format!(
                    "✓ Product '{}' saved with quantity {}",
                    product.product_id, product.quantity
                ),
            );
            Ok(())
        }
    }
}

fn non_negative(quantity: i64) -> Result<i64, CliError> {
    if quantity < 0 {
        return Err(CliError::Validation {
            field: "quantity".into(),
            reason: format!("must be zero or more, got {quantity}"),
        });
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, stock: i64, daily: i64) -> Product {
        Product {
            product_id: id.into(),
            display_name: name.into(),
            stock,
            daily_transactions: daily,
        }
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.product_id.as_str()).collect()
    }

    #[test]
    fn sorts_by_each_column() {
        let mut products = vec![
            product("B2", "gadget", 4, 3),
            product("A1", "Widget", 10, 0),
            product("C3", "Bolt", 4, 7),
        ];

        sort_products(&mut products, InventorySort::Daily);
        assert_eq!(ids(&products), ["A1", "B2", "C3"]);

        sort_products(&mut products, InventorySort::Name);
        assert_eq!(ids(&products), ["C3", "B2", "A1"]);

        // Equal stock keeps the previous order.
        sort_products(&mut products, InventorySort::Stock);
        assert_eq!(ids(&products), ["C3", "B2", "A1"]);

        sort_products(&mut products, InventorySort::Id);
        assert_eq!(ids(&products), ["A1", "B2", "C3"]);
    }

    #[test]
    fn negative_quantities_are_refused() {
        assert!(non_negative(0).is_ok());
        assert!(matches!(non_negative(-1), Err(CliError::Validation { .. })));
    }
}

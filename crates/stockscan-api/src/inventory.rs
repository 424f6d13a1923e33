// Inventory endpoints

use tracing::debug;

use crate::client::InventoryClient;
use crate::error::Error;
use crate::models::{InventoryItem, MovementUpdate, ProductUpsert};

impl InventoryClient {
    /// List every inventory row, header sentinel rows included.
    ///
    /// `GET /api/inventory`
    pub async fn list_inventory(&self) -> Result<Vec<InventoryItem>, Error> {
        self.get("inventory").await
    }

    /// Add a product or overwrite its name and quantity.
    ///
    /// `POST /api/inventory`
    pub async fn upsert_product(&self, product: &ProductUpsert) -> Result<serde_json::Value, Error> {
        debug!(product_id = %product.product_id, "upserting product");
        self.post("inventory", product).await
    }

    /// Apply a batch of stock movements to the inventory quantities.
    ///
    /// `POST /api/update-inventory`
    pub async fn update_inventory(
        &self,
        updates: &[MovementUpdate],
    ) -> Result<serde_json::Value, Error> {
        debug!(rows = updates.len(), "bulk inventory update");
        self.post("update-inventory", updates).await
    }
}

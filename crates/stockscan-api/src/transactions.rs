// Transaction log endpoints

use tracing::debug;

use crate::client::InventoryClient;
use crate::error::Error;
use crate::models::{MessageResponse, MovementUpdate, TransactionEntry};

impl InventoryClient {
    /// Fetch the full transaction log.
    ///
    /// `GET /api/transaction-log`
    pub async fn transaction_log(&self) -> Result<Vec<TransactionEntry>, Error> {
        self.get("transaction-log").await
    }

    /// Append a batch of movements to the transaction log.
    ///
    /// `POST /api/update-log`
    pub async fn append_log(&self, updates: &[MovementUpdate]) -> Result<MessageResponse, Error> {
        debug!(rows = updates.len(), "appending to transaction log");
        self.post("update-log", updates).await
    }
}

// Barcode slot endpoints
//
// The scanner gateway writes the last scanned code into a single server
// slot. Clients read it and nullify it once consumed.

use tracing::debug;

use crate::client::InventoryClient;
use crate::error::Error;
use crate::models::{LatestBarcode, MessageResponse, NullifyRequest};

impl InventoryClient {
    /// Read the pending barcode, if any.
    ///
    /// `GET /api/get-latest-barcode`. Blank codes are reported as `None`.
    pub async fn latest_barcode(&self) -> Result<Option<String>, Error> {
        let latest: LatestBarcode = self.get("get-latest-barcode").await?;
        Ok(latest.barcode.filter(|code| !code.trim().is_empty()))
    }

    /// Mark a barcode as consumed so it is not delivered again.
    ///
    /// `POST /api/nullify-barcode`
    pub async fn nullify_barcode(&self, barcode: &str) -> Result<MessageResponse, Error> {
        debug!(barcode, "nullifying barcode");
        self.post("nullify-barcode", &NullifyRequest { barcode })
            .await
    }
}

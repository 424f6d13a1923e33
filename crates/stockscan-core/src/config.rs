// ── Runtime session configuration ──
//
// Describes how to reach the inventory server and how the scan loop is
// paced. The CLI builds one from its profile and hands it in; core never
// reads config files.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use stockscan_api::{InventoryClient, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Default delay between two reads of the barcode slot.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default pause between seeing a new code and processing it.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);
/// Default quiet period before a typed identifier is auto-submitted.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Inventory server base URL (with or without the `/api` suffix).
    pub api_url: Url,
    /// Optional bearer token sent with every request.
    pub api_token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Barcode slot polling period. Zero disables the poller.
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub debounce: Duration,
    /// Directory exported spreadsheets are written to.
    pub export_dir: PathBuf,
}

impl SessionConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_token: None,
            timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            debounce: DEFAULT_DEBOUNCE,
            export_dir: PathBuf::from("."),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            bearer_token: self.api_token.clone(),
        }
    }

    /// Build an API client for this configuration.
    pub fn client(&self) -> Result<InventoryClient, CoreError> {
        Ok(InventoryClient::new(self.api_url.as_str(), &self.transport())?)
    }
}

// stockscan-api: Async Rust client for the inventory / barcode REST API

mod barcode;
pub mod client;
pub mod error;
mod inventory;
pub mod models;
mod transactions;
pub mod transport;

pub use client::InventoryClient;
pub use error::Error;
pub use models::{
    InventoryItem, LatestBarcode, MessageResponse, MovementKind, MovementUpdate, ProductUpsert,
    TransactionEntry,
};
pub use transport::TransportConfig;

// stockscan-core: Scan loop, reconciliation and export logic between
// stockscan-api and the CLI.

pub mod accumulator;
pub mod command;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod history;
pub mod model;
pub mod poller;
pub mod session;
pub mod stats;

// ── Primary re-exports ──────────────────────────────────────────────
pub use accumulator::{Accumulator, BucketLine, ScanOutcome};
pub use command::ScanOrigin;
pub use config::SessionConfig;
pub use debounce::Debouncer;
pub use error::CoreError;
pub use export::{ExportReport, XLSX_MIME};
pub use poller::BarcodeSource;
pub use session::{ScanSession, SessionSnapshot};
pub use stats::{MovementStats, StatsFilter};

pub use model::{
    Bucket, Catalog, Notification, NotificationLevel, Product, ReconciliationRow, Transaction,
    TransactionType,
};

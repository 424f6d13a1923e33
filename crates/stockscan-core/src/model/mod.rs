// ── Domain model ──
//
// Plain data types shared by the session, the exporter and the read-only
// views (history, statistics).

pub mod bucket;
pub mod catalog;
pub mod notification;
pub mod reconciliation;
pub mod transaction;

pub use bucket::Bucket;
pub use catalog::{Catalog, Product};
pub use notification::{Notification, NotificationLevel, Notifier};
pub use reconciliation::{ReconciliationRow, reconcile};
pub use transaction::{Transaction, TransactionType};

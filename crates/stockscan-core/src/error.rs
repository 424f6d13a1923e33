// ── Core error types ──
//
// User-facing errors from stockscan-core. Consumers never match on HTTP
// transport details; the `From<stockscan_api::Error>` impl folds those
// into the variants below.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Bucket;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach inventory server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Inventory server timed out")]
    Timeout,

    // ── Server errors ────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code, when the server answered.
        status: Option<u16>,
    },

    // ── Scan errors ──────────────────────────────────────────────────
    #[error("Product \"{code}\" is not in the inventory")]
    UnknownProduct { code: String },

    #[error("Nothing to export: the {bucket} bucket is empty")]
    EmptyBucket { bucket: Bucket },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Export errors ────────────────────────────────────────────────
    #[error("Spreadsheet export failed: {message}")]
    Export { message: String },

    /// The file was written but the server update did not go through.
    #[error("Server update failed ({}): {message}", .file.display())]
    Submission { message: String, file: PathBuf },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Scan session is closed")]
    SessionClosed,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Message suitable for an operator notification.
    pub fn notice(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<stockscan_api::Error> for CoreError {
    fn from(err: stockscan_api::Error) -> Self {
        match err {
            stockscan_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            stockscan_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            stockscan_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            stockscan_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            stockscan_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for CoreError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        CoreError::Export {
            message: err.to_string(),
        }
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use stockscan_config::ConfigError;
use stockscan_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the inventory server at {url}")]
    #[diagnostic(
        code(stockscan::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(stockscan::timeout),
        help("Increase the timeout with --timeout or check the server's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("The server refused the request ({status}): {message}")]
    #[diagnostic(
        code(stockscan::auth_failed),
        help(
            "Check the bearer token for this profile.\n\
             Run: stockscan config set-token"
        )
    )]
    AuthFailed { status: u16, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(stockscan::not_found),
        help("Run: stockscan {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Server error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(stockscan::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Scanning & export ────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(stockscan::nothing_to_export))]
    NothingToExport(String),

    #[error("Spreadsheet export failed: {message}")]
    #[diagnostic(
        code(stockscan::export),
        help("Check that the export directory exists and is writable (--export-dir).")
    )]
    Export { message: String },

    #[error("Spreadsheet written to {file} but the server update failed: {message}")]
    #[diagnostic(
        code(stockscan::submission),
        help("The counts were kept. Export again once the server is reachable.")
    )]
    Submission { file: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(stockscan::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(stockscan::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: stockscan config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No inventory server configured")]
    #[diagnostic(
        code(stockscan::no_config),
        help(
            "Create a profile with: stockscan config init\n\
             or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(stockscan::config))]
    Config(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(stockscan::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(stockscan::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(stockscan::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api {
                message,
                status: Some(status @ (401 | 403)),
            } => CliError::AuthFailed { status, message },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::UnknownProduct { code } => CliError::NotFound {
                resource_type: "product".into(),
                identifier: code,
                list_command: "inventory list".into(),
            },

            err @ CoreError::EmptyBucket { .. } => CliError::NothingToExport(err.to_string()),

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Export { message } => CliError::Export { message },

            CoreError::Submission { message, file } => CliError::Submission {
                file: file.display().to_string(),
                message,
            },

            CoreError::Config { message } => CliError::Config(message),

            err @ CoreError::SessionClosed => CliError::Internal(err.to_string()),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<stockscan_api::Error> for CliError {
    fn from(err: stockscan_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_auth_exit_code() {
        let err = CliError::from(CoreError::Api {
            message: "token expired".into(),
            status: Some(401),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(CoreError::Api {
            message: "boom".into(),
            status: Some(500),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(err.to_string(), "Server error (HTTP 500): boom");
    }

    #[test]
    fn unknown_product_is_not_found() {
        let err = CliError::from(CoreError::UnknownProduct { code: "B2".into() });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "product 'B2' not found");
    }

    #[test]
    fn missing_profile_lists_alternatives() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "depot".into(),
            available: vec!["shop".into(), "back".into()],
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        match err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "shop, back"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}

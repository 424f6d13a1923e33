//! Shared helpers for command handlers.

use chrono::NaiveDate;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Trimmed `value`, or a validation error naming `field` when blank.
pub fn require_non_empty(field: &str, value: &str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(trimmed.to_owned())
}

/// Parse a `YYYY-MM-DD` day given for `field`.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("expected YYYY-MM-DD, got '{value}' ({e})"),
    })
}

/// Status line on stderr, unless `--quiet`.
pub fn note(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(matches!(
            require_non_empty("name", "   "),
            Err(CliError::Validation { ref field, .. }) if field == "name"
        ));
        assert_eq!(require_non_empty("id", " A1 ").ok().as_deref(), Some("A1"));
    }

    #[test]
    fn dates_use_iso_format() {
        assert_eq!(
            parse_date("from", "2026-03-01").ok(),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert!(parse_date("from", "01/03/2026").is_err());
    }
}

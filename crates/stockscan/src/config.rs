//! CLI configuration: thin wrapper around `stockscan_config`.
//!
//! Adds the flag overrides (`--api-url`, `--api-token`, `--timeout`,
//! `--export-dir`, session pacing) on top of the shared profile
//! resolution.

use std::time::Duration;

use secrecy::SecretString;

use stockscan_core::SessionConfig;

use crate::cli::{GlobalOpts, SessionArgs};
use crate::error::CliError;

pub use stockscan_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_api_token,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build a `SessionConfig` from the config file, profile, and CLI flags.
///
/// Without any profile, `--api-url` alone is enough.
pub fn resolve_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // An explicitly requested profile must exist.
    let mut profile = if global.profile.is_some() {
        cfg.profile(&profile_name)?.clone()
    } else {
        cfg.profiles.get(&profile_name).cloned().unwrap_or_default()
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if profile.api_url.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    let mut session =
        stockscan_config::profile_to_session_config(&profile, &profile_name, cfg.defaults.timeout)?;

    if let Some(ref token) = global.api_token {
        session.api_token = Some(SecretString::from(token.clone()));
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    if let Some(ref dir) = global.export_dir {
        session.export_dir.clone_from(dir);
    }

    tracing::debug!(
        profile = %profile_name,
        url = %session.api_url,
        export_dir = %session.export_dir.display(),
        "resolved session config"
    );
    Ok(session)
}

/// Apply the pacing flags of `scan` / `validate`.
pub fn apply_session_args(session: &mut SessionConfig, args: &SessionArgs) {
    if let Some(ms) = args.poll_interval_ms {
        session.poll_interval = Duration::from_millis(ms);
    }
    if args.no_poll {
        session.poll_interval = Duration::ZERO;
    }
    if let Some(ms) = args.debounce_ms {
        session.debounce = Duration::from_millis(ms);
    }
}

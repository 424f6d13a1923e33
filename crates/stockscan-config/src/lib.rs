//! Configuration for the stockscan tools.
//!
//! TOML profiles layered with `STOCKSCAN_` environment overrides, API
//! token resolution (env var, keyring, plaintext), and translation to
//! `stockscan_core::SessionConfig`. The CLI adds flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{ProjectDirs, UserDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockscan_core::SessionConfig;

/// Keyring service name; entries are keyed `{profile}/api-token`.
pub const KEYRING_SERVICE: &str = "stockscan";

/// Environment variable that points at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "STOCKSCAN_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Profile name to use: the explicit one, else the configured default.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(ToOwned::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profiles.keys().cloned().collect(),
            })
    }

    /// Copy with every plaintext token masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for profile in copy.profiles.values_mut() {
            if profile.api_token.is_some() {
                profile.api_token = Some("********".into());
            }
        }
        copy
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// One inventory server and how to pace the scan loop against it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL, e.g. "http://192.168.1.20:5000".
    pub api_url: String,

    /// Bearer token (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token_env: Option<String>,

    /// Where spreadsheets are written. Defaults to the download directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle_delay_ms: Option<u64>,

    /// Overrides `defaults.timeout`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path: `STOCKSCAN_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "stockscan", "stockscan").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stockscan");
    p
}

/// The user's download directory, else the working directory.
pub fn default_export_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full config from the canonical path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if any), then `STOCKSCAN_*`
/// variables. Nested keys use a double underscore:
/// `STOCKSCAN_PROFILES__SHOP__API_URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STOCKSCAN_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, falling back to defaults when it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/api-token"),
    )?)
}

/// Resolve the bearer token: `api_token_env`, then the system keyring,
/// then the plaintext value. The server may not require one at all.
pub fn resolve_api_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(ref env_name) = profile.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(secret) = keyring_entry(profile_name).and_then(|e| e.get_password().map_err(ConfigError::from)) {
        return Some(SecretString::from(secret));
    }

    profile.api_token.clone().map(SecretString::from)
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_api_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: "no server URL configured".into(),
        });
    }
    raw.trim().parse().map_err(|e| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

/// Build a `SessionConfig` from a profile, with no flag overrides.
///
/// `default_timeout` is the `[defaults]` timeout, used when the profile
/// sets none.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    default_timeout: u64,
) -> Result<SessionConfig, ConfigError> {
    let mut config = SessionConfig::new(parse_api_url(&profile.api_url)?);

    config.api_token = resolve_api_token(profile, profile_name);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(default_timeout));
    if let Some(ms) = profile.poll_interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.debounce_ms {
        config.debounce = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.settle_delay_ms {
        config.settle_delay = Duration::from_millis(ms);
    }
    config.export_dir = profile
        .export_dir
        .clone()
        .unwrap_or_else(default_export_dir);

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn shop() -> Profile {
        Profile {
            api_url: "http://10.0.0.5:5000".into(),
            export_dir: Some(PathBuf::from("/srv/exports")),
            poll_interval_ms: Some(250),
            debounce_ms: Some(800),
            ..Profile::default()
        }
    }

    #[test]
    fn toml_file_round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.default_profile = Some("shop".into());
        cfg.profiles.insert("shop".into(), shop());
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("shop"));
        assert_eq!(loaded.defaults.output, "table");
        let profile = loaded.profile("shop").unwrap();
        assert_eq!(profile.api_url, "http://10.0.0.5:5000");
        assert_eq!(profile.poll_interval_ms, Some(250));
        assert_eq!(profile.settle_delay_ms, None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.defaults.timeout, 30);
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn hand_written_toml_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "back-office"

[defaults]
output = "json"

[profiles.back-office]
api_url = "http://stock.local"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.profile("back-office").unwrap().timeout, Some(5));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("shop".into(), shop());
        match cfg.profile("depot") {
            Err(ConfigError::ProfileNotFound { name, available }) => {
                assert_eq!(name, "depot");
                assert_eq!(available, vec!["shop".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn active_profile_prefers_explicit_name() {
        let cfg = Config {
            default_profile: Some("shop".into()),
            ..Config::default()
        };
        assert_eq!(cfg.active_profile_name(Some("depot")), "depot");
        assert_eq!(cfg.active_profile_name(None), "shop");

        let bare = Config {
            default_profile: None,
            ..Config::default()
        };
        assert_eq!(bare.active_profile_name(None), "default");
    }

    #[test]
    fn redacted_masks_plaintext_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "shop".into(),
            Profile {
                api_token: Some("s3cret".into()),
                ..shop()
            },
        );
        cfg.profiles.insert("depot".into(), shop());

        let shown = cfg.redacted();
        assert_eq!(shown.profiles["shop"].api_token.as_deref(), Some("********"));
        assert_eq!(shown.profiles["depot"].api_token, None);
        assert_eq!(cfg.profiles["shop"].api_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn profile_translates_to_session_config() {
        let config = profile_to_session_config(&shop(), "shop-test-no-keyring", 12).unwrap();
        assert_eq!(config.api_url.as_str(), "http://10.0.0.5:5000/");
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.debounce, Duration::from_millis(800));
        assert_eq!(
            config.settle_delay,
            stockscan_core::config::DEFAULT_SETTLE_DELAY
        );
        assert_eq!(config.export_dir, PathBuf::from("/srv/exports"));
    }

    #[test]
    fn token_env_var_wins_over_plaintext() {
        let var = "STOCKSCAN_TEST_TOKEN_7F3A";
        // set_var is unsafe in this edition; borrow a variable every
        // environment has.
        let profile = Profile {
            api_token: Some("plain".into()),
            api_token_env: Some("PATH".into()),
            ..shop()
        };
        let token = resolve_api_token(&profile, "shop-test-no-keyring").unwrap();
        assert_eq!(token.expose_secret(), std::env::var("PATH").unwrap());

        let fallback = Profile {
            api_token: Some("plain".into()),
            api_token_env: Some(var.into()),
            ..shop()
        };
        let token = resolve_api_token(&fallback, "shop-test-no-keyring").unwrap();
        assert_eq!(token.expose_secret(), "plain");
    }

    #[test]
    fn blank_or_invalid_url_is_rejected() {
        let blank = Profile::default();
        assert!(matches!(
            profile_to_session_config(&blank, "x", 30),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));
        assert!(parse_api_url("not a url").is_err());
    }
}

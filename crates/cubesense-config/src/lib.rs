//! Configuration for cubesense.
//!
//! A single TOML file plus `CUBESENSE_*` environment overrides, token
//! resolution (env var, system keyring, plaintext), and translation to
//! the runtime types in `cubesense_core`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cubesense_core::{CloudConfig, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL_SECS, RepositoryConfig};

/// Keyring service name the token is stored under.
pub const KEYRING_SERVICE: &str = "cubesense";
const KEYRING_USER: &str = "api-token";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "CUBESENSE_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured")]
    NoCredentials,

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// On-disk configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// API root of the sensor cloud.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API token (plaintext; prefer the keyring or `token_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Name of an environment variable holding the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Seconds a refreshed reading stays cached. 0 never expires.
    #[serde(default = "default_ttl")]
    pub ttl: u64,

    /// Per-request timeout in seconds. 0 disables it.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Devices fetched in parallel during a refresh.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Let concurrent readers share one refresh.
    #[serde(default = "default_single_flight")]
    pub single_flight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            token_env: None,
            ttl: default_ttl(),
            timeout: default_timeout(),
            fetch_concurrency: default_fetch_concurrency(),
            single_flight: default_single_flight(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}
fn default_timeout() -> u64 {
    10
}
fn default_fetch_concurrency() -> usize {
    16
}
fn default_single_flight() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `CUBESENSE_CONFIG`, then the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "cubesense", "cubesense").map_or_else(
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
    p.push("cubesense");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

/// Load config from `path` plus environment. A missing file is not an
/// error; defaults fill the gaps.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CUBESENSE_").ignore(&["config"]))
        .extract()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Write config to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_to(cfg, &config_path())
}

pub fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

/// Resolve the API token: `token_env`, then the system keyring, then the
/// plaintext `token` field.
pub fn resolve_token(cfg: &Config) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = cfg.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = cfg.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials)
}

/// Store the API token in the system keyring.
pub fn store_token(token: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(token.expose_secret())?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build the cloud connection settings from `cfg` and an already
/// resolved token.
pub fn to_cloud_config(cfg: &Config, token: SecretString) -> Result<CloudConfig, ConfigError> {
    let base_url: url::Url = cfg.api_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {}", cfg.api_url),
    })?;

    // A zero timeout only lifts the per-call deadline; the HTTP client
    // keeps a hard ceiling.
    let timeout = match cfg.timeout {
        0 => Duration::from_secs(300),
        secs => Duration::from_secs(secs),
    };

    Ok(CloudConfig {
        base_url,
        token,
        timeout,
    })
}

pub fn to_repository_config(cfg: &Config) -> Result<RepositoryConfig, ConfigError> {
    if cfg.fetch_concurrency == 0 {
        return Err(ConfigError::Validation {
            field: "fetch_concurrency".into(),
            reason: "must be at least 1".into(),
        });
    }

    Ok(RepositoryConfig {
        ttl: Duration::from_secs(cfg.ttl),
        fetch_concurrency: cfg.fetch_concurrency,
        request_timeout: (cfg.timeout > 0).then(|| Duration::from_secs(cfg.timeout)),
        single_flight: cfg.single_flight,
    })
}

// ── Runtime configuration ──
//
// These types describe how to reach the sensor cloud and how the
// repository caches and fans out. They carry credential data and tuning,
// but never touch disk: the CLI constructs them and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use cubesense_api::{CloudClient, DEFAULT_BASE_URL, TransportConfig};

use crate::error::CoreError;

/// Default cache time-to-live.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// How to reach the CubeSensors cloud.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// API root (e.g. `https://api.cubesensors.com/v1`).
    pub base_url: Url,
    /// Bearer token for the account.
    pub token: SecretString,
    /// Whole-request HTTP timeout.
    pub timeout: Duration,
}

impl CloudConfig {
    pub fn new(token: SecretString) -> Result<Self, CoreError> {
        let base_url = DEFAULT_BASE_URL.parse().map_err(|e| CoreError::Config {
            message: format!("invalid default API URL: {e}"),
        })?;
        Ok(Self {
            base_url,
            token,
            timeout: Duration::from_secs(30),
        })
    }

    /// Build the HTTP client described by this config.
    pub fn build_client(&self) -> Result<CloudClient, CoreError> {
        let transport = TransportConfig::default().with_timeout(self.timeout);
        Ok(CloudClient::new(
            self.base_url.clone(),
            &self.token,
            &transport,
        )?)
    }
}

/// Cache and fan-out tuning for a [`Repository`](crate::Repository).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// How long a refreshed aggregate stays fresh. Zero never expires.
    pub ttl: Duration,
    /// Upper bound on devices whose info/state pair is in flight at once.
    pub fetch_concurrency: usize,
    /// Per-call deadline for each cloud request. `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Serialize concurrent cache misses so only one refresh runs.
    pub single_flight: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            fetch_concurrency: 16,
            request_timeout: Some(Duration::from_secs(10)),
            single_flight: true,
        }
    }
}

impl RepositoryConfig {
    /// Override the cache time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_thirty_second_ttl() {
        let cfg = RepositoryConfig::default();
        assert_eq!(cfg.ttl, Duration::from_secs(30));
        assert!(cfg.single_flight);
        assert!(cfg.fetch_concurrency > 0);
    }

    #[test]
    fn cloud_config_points_at_public_api() {
        let cfg = CloudConfig::new(SecretString::from("t".to_string())).unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://api.cubesensors.com/v1");
        assert!(cfg.build_client().is_ok());
    }
}

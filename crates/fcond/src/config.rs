//! Daemon configuration (TOML)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fcon_auth::{DEFAULT_AUTHORIZE_URL, DEFAULT_TOKEN_URL};
use fcon_client::DEFAULT_BASE_URL;
use fcon_integration::{CoordinatorConfig, DEFAULT_UPDATE_INTERVAL, RATE_LIMIT_BACKOFF};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub account: AccountConfig,
    pub token: TokenConfig,
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub oauth: OAuthConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub entry_id: String,
    /// Looked up from the garage endpoint when absent
    pub vin: Option<String>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            entry_id: "default".to_string(),
            vin: None,
        }
    }
}

/// Where the bearer token comes from. `token_file` wins if both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub access_token: Option<String>,
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
    pub rate_limit_backoff_secs: u64,
    /// Delay between setup attempts while not ready
    pub setup_retry_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_UPDATE_INTERVAL.as_secs(),
            rate_limit_backoff_secs: RATE_LIMIT_BACKOFF.as_secs(),
            setup_retry_secs: 30,
        }
    }
}

impl PollingConfig {
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            update_interval: Duration::from_secs(self.interval_secs),
            rate_limit_backoff: Duration::from_secs(self.rate_limit_backoff_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub authorize_url: String,
    pub token_url: String,
    /// Token manager endpoint the restored callback is forwarded to
    pub completion_url: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            completion_url: "http://localhost:8123/auth/external/callback".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8124,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Last values of restorable sensors; restoring is off when unset
    pub restore_path: Option<PathBuf>,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8124);
        assert_eq!(config.polling.interval_secs, 30);
        assert_eq!(config.polling.rate_limit_backoff_secs, 60);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(config.account.vin.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [account]
            vin = "WF0XXXGCDX1234567"

            [token]
            token_file = "/var/lib/fcond/token.json"

            [polling]
            interval_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.account.entry_id, "default");
        assert_eq!(config.account.vin.as_deref(), Some("WF0XXXGCDX1234567"));
        assert_eq!(
            config.token.token_file,
            Some(PathBuf::from("/var/lib/fcond/token.json"))
        );
        let coordinator = config.polling.coordinator();
        assert_eq!(coordinator.update_interval, Duration::from_secs(120));
        assert_eq!(coordinator.rate_limit_backoff, RATE_LIMIT_BACKOFF);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(include_str!("../fcond.example.toml")).unwrap();
        assert_eq!(config.server.port, 8124);
        assert!(config.storage.restore_path.is_some());
        assert_eq!(config.oauth.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fcond.toml");
        std::fs::write(&path, "[server]\nport = 9000\nbind = \"127.0.0.1\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.addr().to_string(), "127.0.0.1:9000");

        std::fs::write(&path, "[server\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}

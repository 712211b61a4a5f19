use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use snafu::ResultExt;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use url::Url;

use crate::error::{ApplicationError, ConfigLoadSnafu};
use crate::model::PositionPolicy;

/// Everything the service reads from the environment (and `.env`) at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address", default = "default_host")]
    pub host: SocketAddr,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub position_policy: PositionPolicy,
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(skip)]
    pub retry: RetryConfig,
    #[serde(skip)]
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        let mut config = envy::from_env::<Config>().context(ConfigLoadSnafu)?;
        config.retry = envy::from_env::<RetryConfig>().context(ConfigLoadSnafu)?;
        config.store = StoreConfig {
            backend: envy::from_env::<BackendSelection>()
                .context(ConfigLoadSnafu)?
                .store_backend,
            surreal: envy::prefixed("SURREAL_")
                .from_env::<SurrealConfig>()
                .context(ConfigLoadSnafu)?,
        };

        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Surreal,
}

#[derive(Debug, Deserialize)]
struct BackendSelection {
    #[serde(default)]
    store_backend: StoreBackend,
}

#[derive(Debug, Default, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub surreal: SurrealConfig,
}

/// Read with the `SURREAL_` prefix, e.g. `SURREAL_ENDPOINT=http://localhost:8000`.
#[derive(Debug, Deserialize, Clone)]
pub struct SurrealConfig {
    #[serde(default = "default_surreal_endpoint")]
    pub endpoint: Url,
    #[serde(default = "default_surreal_namespace")]
    pub namespace: String,
    #[serde(default = "default_surreal_database")]
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SurrealConfig {
    fn default() -> Self {
        Self {
            endpoint: default_surreal_endpoint(),
            namespace: default_surreal_namespace(),
            database: default_surreal_database(),
            username: None,
            password: None,
        }
    }
}

/// Bounds the read-merge-write retries after a write conflict.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

impl RetryConfig {
    /// Exponential backoff with jitter, `2 * base`, `4 * base`, ... capped at one second.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(2)
            .factor(self.retry_base_ms)
            .max_delay(Duration::from_secs(1))
            .map(jitter)
            .take(self.max_retries)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

fn default_host() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5001))
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_surreal_endpoint() -> Url {
    Url::parse("mem://").expect("`mem://` is a valid url")
}

fn default_surreal_namespace() -> String {
    "watch".to_string()
}

fn default_surreal_database() -> String {
    "progress".to_string()
}

fn default_max_retries() -> usize {
    5
}

fn default_retry_base_ms() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_to_an_empty_environment() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();

        assert_eq!(config.host, default_host());
        assert_eq!(config.position_policy, PositionPolicy::LastWrite);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config: Config = envy::from_iter(vars(&[
            ("HOST_ADDRESS", "127.0.0.1:8080"),
            ("POSITION_POLICY", "furthest"),
            ("ALLOWED_ORIGINS", "http://localhost:5173,https://example.com"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.position_policy, PositionPolicy::Furthest);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "https://example.com"]
        );
    }

    #[test]
    fn surreal_settings_use_their_prefix() {
        let surreal: SurrealConfig = envy::prefixed("SURREAL_")
            .from_iter(vars(&[
                ("SURREAL_ENDPOINT", "http://localhost:8000"),
                ("SURREAL_USERNAME", "root"),
                ("SURREAL_PASSWORD", "root"),
            ]))
            .unwrap();

        assert_eq!(surreal.endpoint.as_str(), "http://localhost:8000/");
        assert_eq!(surreal.namespace, "watch");
        assert_eq!(surreal.username.as_deref(), Some("root"));
    }

    #[test]
    fn retry_strategy_is_bounded() {
        let retry: RetryConfig = envy::from_iter(vars(&[("MAX_RETRIES", "3")])).unwrap();

        let delays: Vec<Duration> = retry.strategy().collect();
        assert_eq!(delays.len(), 3);
        assert!(delays.iter().all(|delay| *delay <= Duration::from_secs(1)));
    }

    #[test]
    fn backend_defaults_to_memory() {
        let selection: BackendSelection = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(selection.store_backend, StoreBackend::Memory);

        let selection: BackendSelection =
            envy::from_iter(vars(&[("STORE_BACKEND", "surreal")])).unwrap();
        assert_eq!(selection.store_backend, StoreBackend::Surreal);
    }
}

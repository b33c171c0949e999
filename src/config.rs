use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_INFLIGHT_DELIVERIES: usize = 64;

// Relay configuration sourced from environment variables, with an optional
// YAML override file (RELAY_CONFIG).
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub delivery_timeout_ms: u64,
    pub max_inflight_deliveries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_pg_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_pg_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_pg_max_connections() -> u32 {
    8
}

fn default_pg_acquire_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Deserialize)]
struct RelayConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<StorageBackend>,
    postgres: Option<PostgresConfig>,
    delivery_timeout_ms: Option<u64>,
    max_inflight_deliveries: Option<usize>,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("RELAY_BIND")
            .unwrap_or_else(|_| "0.0.0.0:4000".to_string())
            .parse()
            .with_context(|| "parse RELAY_BIND")?;
        let metrics_bind = std::env::var("RELAY_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse RELAY_METRICS_BIND")?;
        let storage = match std::env::var("RELAY_STORAGE") {
            Ok(value) if value.eq_ignore_ascii_case("postgres") => StorageBackend::Postgres,
            Ok(value) if value.eq_ignore_ascii_case("memory") => StorageBackend::Memory,
            Ok(value) => anyhow::bail!("unknown RELAY_STORAGE backend: {value}"),
            Err(_) => StorageBackend::Memory,
        };
        let postgres = match std::env::var("RELAY_PG_URL") {
            Ok(url) => Some(PostgresConfig {
                url,
                max_connections: env_parsed("RELAY_PG_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_pg_max_connections),
                acquire_timeout_ms: env_parsed("RELAY_PG_ACQUIRE_TIMEOUT_MS")?
                    .unwrap_or_else(default_pg_acquire_timeout_ms),
            }),
            Err(_) => None,
        };
        let delivery_timeout_ms =
            env_parsed("RELAY_DELIVERY_TIMEOUT_MS")?.unwrap_or(DEFAULT_DELIVERY_TIMEOUT_MS);
        let max_inflight_deliveries =
            env_parsed("RELAY_MAX_INFLIGHT_DELIVERIES")?.unwrap_or(DEFAULT_MAX_INFLIGHT_DELIVERIES);
        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            delivery_timeout_ms,
            max_inflight_deliveries,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("RELAY_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read RELAY_CONFIG: {path}"))?;
            let override_cfg: RelayConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse relay config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.storage {
                config.storage = value;
            }
            if let Some(value) = override_cfg.postgres {
                config.postgres = Some(value);
            }
            if let Some(value) = override_cfg.delivery_timeout_ms {
                config.delivery_timeout_ms = value;
            }
            if let Some(value) = override_cfg.max_inflight_deliveries {
                config.max_inflight_deliveries = value;
            }
        }
        Ok(config)
    }
}

fn env_parsed<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => Ok(Some(
            value.parse().with_context(|| format!("parse {key}"))?,
        )),
        Err(_) => Ok(None),
    }
}

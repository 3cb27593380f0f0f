//! # API Configuration
//!
//! Environment-based configuration for the fleet API service.

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use fleet_persistence::{CacheConfig, ReadStrategy, ScyllaConfig};

/// Where vehicle statuses and trips are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Scylla,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scylla" | "scylladb" => Ok(Self::Scylla),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown store backend '{other}' (expected scylla or memory)")),
        }
    }
}

/// Where cached statuses live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown cache backend '{other}' (expected redis or memory)")),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    pub store_backend: StoreBackend,

    /// ScyllaDB connection, used with [`StoreBackend::Scylla`]
    pub scylla: ScyllaConfig,

    pub cache_backend: CacheBackend,

    /// Redis connection, used with [`CacheBackend::Redis`]
    pub redis: CacheConfig,

    /// How status reads use the cache
    pub read_strategy: ReadStrategy,

    /// Run the telemetry simulator alongside the server
    pub simulator_enabled: bool,

    /// Logging level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// A variable is set to a value that does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_addr = var("SERVER_ADDR", "0.0.0.0:8080");
        let server_addr = server_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid SERVER_ADDR '{server_addr}'"))?;

        let read_strategy = var("STATUS_READ_STRATEGY", "cache_first")
            .parse::<ReadStrategy>()
            .map_err(|e| anyhow!(e))
            .context("invalid STATUS_READ_STRATEGY")?;

        Ok(Self {
            server_addr,

            store_backend: var("STORE_BACKEND", "scylla")
                .parse::<StoreBackend>()
                .context("invalid STORE_BACKEND")?,

            scylla: ScyllaConfig {
                hosts: var("SCYLLA_HOSTS", "127.0.0.1:9042")
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(String::from)
                    .collect(),
                keyspace: var("SCYLLA_KEYSPACE", "fleet"),
                username: lookup("SCYLLA_USERNAME"),
                password: lookup("SCYLLA_PASSWORD"),
            },

            cache_backend: var("CACHE_BACKEND", "redis")
                .parse::<CacheBackend>()
                .context("invalid CACHE_BACKEND")?,

            redis: CacheConfig {
                url: var("REDIS_URL", "redis://127.0.0.1:6379"),
            },

            read_strategy,

            simulator_enabled: parse_flag(&var("SIMULATOR_ENABLED", "true"))
                .context("invalid SIMULATOR_ENABLED")?,

            log_level: var("LOG_LEVEL", "info"),
        })
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.store_backend, StoreBackend::Scylla);
        assert_eq!(config.scylla.hosts, vec!["127.0.0.1:9042"]);
        assert_eq!(config.scylla.keyspace, "fleet");
        assert_eq!(config.scylla.username, None);
        assert_eq!(config.cache_backend, CacheBackend::Redis);
        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
        assert_eq!(config.read_strategy, ReadStrategy::CacheFirst);
        assert!(config.simulator_enabled);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SERVER_ADDR", "127.0.0.1:3000"),
            ("STORE_BACKEND", "memory"),
            ("SCYLLA_HOSTS", "a:9042, b:9042,"),
            ("SCYLLA_USERNAME", "fleet"),
            ("CACHE_BACKEND", "MEMORY"),
            ("STATUS_READ_STRATEGY", "read-through"),
            ("SIMULATOR_ENABLED", "0"),
        ])
        .unwrap();

        assert_eq!(config.server_addr.port(), 3000);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.scylla.hosts, vec!["a:9042", "b:9042"]);
        assert_eq!(config.scylla.username.as_deref(), Some("fleet"));
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.read_strategy, ReadStrategy::ReadThrough);
        assert!(!config.simulator_enabled);
    }

    #[test]
    fn test_rejects_bad_values() {
        for vars in [
            [("SERVER_ADDR", "not an addr")],
            [("STORE_BACKEND", "postgres")],
            [("CACHE_BACKEND", "memcached")],
            [("STATUS_READ_STRATEGY", "write_behind")],
            [("SIMULATOR_ENABLED", "maybe")],
        ] {
            let err = config(&vars).unwrap_err();
            assert!(err.to_string().contains(vars[0].0), "{err:#}");
        }
    }
}

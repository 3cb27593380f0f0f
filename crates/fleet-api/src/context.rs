//! # API Context
//!
//! Application state shared by every request handler.

use std::sync::Arc;

use fleet_persistence::{
    CacheClient, InMemoryCache, InMemoryFleetStore, ReadStrategy, ScyllaClient, ScyllaFleetStore,
    SharedCache, SharedStore,
};
use fleet_service::FleetService;

use crate::config::{CacheBackend, Config, StoreBackend};

/// Application context shared across all handlers
#[derive(Clone)]
pub struct ApiContext {
    /// Ingestion and query core, also driven by the simulator
    pub service: FleetService,
}

impl ApiContext {
    pub const fn new(service: FleetService) -> Self {
        Self { service }
    }

    /// Context over in-process store and cache.
    pub fn in_memory(strategy: ReadStrategy) -> Self {
        Self::new(FleetService::with_read_strategy(
            Arc::new(InMemoryFleetStore::new()),
            Arc::new(InMemoryCache::new()),
            strategy,
        ))
    }

    /// Open the configured store and cache.
    ///
    /// # Errors
    ///
    /// ScyllaDB or Redis could not be reached.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let store: SharedStore = match config.store_backend {
            StoreBackend::Scylla => {
                tracing::info!(
                    hosts = ?config.scylla.hosts,
                    keyspace = %config.scylla.keyspace,
                    "Connecting to ScyllaDB"
                );
                let client = ScyllaClient::new(config.scylla.clone()).await?;
                tracing::info!("ScyllaDB connected");
                Arc::new(ScyllaFleetStore::new(Arc::new(client)))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store, data will not survive a restart");
                Arc::new(InMemoryFleetStore::new())
            }
        };

        let cache: SharedCache = match config.cache_backend {
            CacheBackend::Redis => {
                tracing::info!(url = %config.redis.url, "Connecting to Redis");
                let client = CacheClient::new(config.redis.clone()).await?;
                tracing::info!("Redis connected");
                Arc::new(client)
            }
            CacheBackend::Memory => {
                tracing::info!("Using in-memory status cache");
                Arc::new(InMemoryCache::new())
            }
        };

        tracing::info!(strategy = ?config.read_strategy, "Status read strategy");

        Ok(Self::new(FleetService::with_read_strategy(
            store,
            cache,
            config.read_strategy,
        )))
    }
}

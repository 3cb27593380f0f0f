//! # Fleet Service
//!
//! The telemetry core: one ingestion path for every status update, a
//! cache-aside status reader and trip queries, behind [`FleetService`].
//!
//! ```text
//!  client / simulator
//!         │ ingest                           │ get_status
//!         ▼                                  ▼
//!  ┌──────────────────┐              ┌──────────────────┐
//!  │ IngestionPipeline│              │   StatusReader   │
//!  └──────────────────┘              └──────────────────┘
//!     │ 1. upsert status                │ 1. cache (try)
//!     │ 2. insert trip (best effort)    │ 2. store (fallback)
//!     │ 3. cache set   (best effort)    │ 3. cache set (best effort)
//!     ▼                                  ▼
//!  ┌──────────────────────────────────────────────────────┐
//!  │  FleetStore (authoritative)   StatusCache (5 min TTL) │
//!  └──────────────────────────────────────────────────────┘
//! ```
//!
//! Best-effort failures never fail the call; they are logged and returned
//! as [`SoftError`]s next to the primary result.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod cache_entry;
pub mod error;
pub mod ingest;
mod soft_error;
pub mod status;
pub mod trips;

#[cfg(test)]
mod testing;

use std::time::Duration;

use chrono::{DateTime, Utc};
use fleet_domain::IngestPayload;
use fleet_persistence::{ReadStrategy, SharedCache, SharedStore};

pub use cache_entry::status_cache_key;
pub use error::ServiceError;
pub use ingest::{IngestReport, IngestionPipeline};
pub use soft_error::SoftError;
pub use status::{StatusLookup, StatusReader};
pub use trips::{TripLookup, TripQuery};

/// Expiry of every status cache entry, on both the write and read paths.
pub const STATUS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Entry point shared by request handlers and the simulator.
///
/// Cloning is cheap; all clones share the same store and cache.
#[derive(Clone)]
pub struct FleetService {
    store: SharedStore,
    pipeline: IngestionPipeline,
    reader: StatusReader,
    trips: TripQuery,
}

impl FleetService {
    /// Service with the default [`ReadStrategy::CacheFirst`] reader.
    pub fn new(store: SharedStore, cache: SharedCache) -> Self {
        Self::with_read_strategy(store, cache, ReadStrategy::default())
    }

    pub fn with_read_strategy(
        store: SharedStore,
        cache: SharedCache,
        strategy: ReadStrategy,
    ) -> Self {
        Self {
            pipeline: IngestionPipeline::new(store.clone(), cache.clone()),
            reader: StatusReader::new(store.clone(), cache, strategy),
            trips: TripQuery::new(store.clone()),
            store,
        }
    }

    pub const fn read_strategy(&self) -> ReadStrategy {
        self.reader.strategy()
    }

    /// See [`IngestionPipeline::ingest`].
    ///
    /// # Errors
    ///
    /// Validation or status-write failures.
    pub async fn ingest(&self, payload: &IngestPayload) -> Result<IngestReport, ServiceError> {
        self.pipeline.ingest(payload).await
    }

    /// See [`StatusReader::get_status`].
    ///
    /// # Errors
    ///
    /// Store failures only.
    pub async fn get_status(&self, vehicle_id: &str) -> Result<StatusLookup, ServiceError> {
        self.reader.get_status(vehicle_id).await
    }

    /// # Errors
    ///
    /// Store failures only.
    pub async fn get_trips_since(
        &self,
        vehicle_id: &str,
        since: DateTime<Utc>,
    ) -> Result<TripLookup, ServiceError> {
        self.trips.trips_since(vehicle_id, since).await
    }

    /// # Errors
    ///
    /// Store failures only.
    pub async fn get_trips_last_24h(&self, vehicle_id: &str) -> Result<TripLookup, ServiceError> {
        self.trips.trips_last_24h(vehicle_id).await
    }

    /// Every vehicle id the store knows.
    ///
    /// # Errors
    ///
    /// `VehicleList` when the store query fails.
    pub async fn list_vehicle_ids(&self) -> Result<Vec<String>, ServiceError> {
        self.store
            .list_vehicle_ids()
            .await
            .map_err(ServiceError::VehicleList)
    }
}

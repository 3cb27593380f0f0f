//! # Repository Traits
//!
//! Abstract store interfaces for vehicles and trips.
//! Implementations can be swapped for different backends (ScyllaDB, in-memory, test doubles).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use fleet_domain::{TelemetryStatus, Trip};

// =============================================================================
// VEHICLE REPOSITORY
// =============================================================================

/// Latest-status storage, one row per vehicle.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Insert or update the latest status for a vehicle.
    ///
    /// The plate is write-once: it is stored only while the vehicle has
    /// none, and an empty `plate_number` never counts as one.
    async fn upsert_status(
        &self,
        vehicle_id: &str,
        plate_number: &str,
        status: &TelemetryStatus,
    ) -> Result<()>;

    /// Latest status, or `None` for an unknown vehicle.
    async fn get_status(&self, vehicle_id: &str) -> Result<Option<TelemetryStatus>>;

    /// Every vehicle id the store knows about.
    async fn list_vehicle_ids(&self) -> Result<Vec<String>>;
}

// =============================================================================
// TRIP REPOSITORY
// =============================================================================

/// Append-only trip log.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Append a trip.
    async fn insert_trip(&self, trip: &Trip) -> Result<()>;

    /// Trips with `start_time >= since`, newest first. Empty when none match
    /// or the id is not a UUID.
    async fn get_trips_since(&self, vehicle_id: &str, since: DateTime<Utc>) -> Result<Vec<Trip>>;
}

// =============================================================================
// COMBINED STORE
// =============================================================================

/// Everything the fleet core needs from the persistent store.
pub trait FleetStore: VehicleRepository + TripRepository {}

impl<T: VehicleRepository + TripRepository + ?Sized> FleetStore for T {}

/// Shared store handle
pub type SharedStore = Arc<dyn FleetStore>;

//! Trip history queries.

use chrono::{DateTime, Duration, Utc};
use fleet_domain::Trip;
use fleet_persistence::SharedStore;

use crate::error::ServiceError;

/// Trips of one vehicle, newest first, or a named empty outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum TripLookup {
    Trips(Vec<Trip>),
    NoTrips,
}

impl TripLookup {
    fn from_rows(trips: Vec<Trip>) -> Self {
        if trips.is_empty() {
            Self::NoTrips
        } else {
            Self::Trips(trips)
        }
    }

    /// The trips, empty for [`TripLookup::NoTrips`].
    pub fn into_trips(self) -> Vec<Trip> {
        match self {
            Self::Trips(trips) => trips,
            Self::NoTrips => Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct TripQuery {
    store: SharedStore,
}

impl TripQuery {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Trips whose `start_time` is at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// `TripRead` when the store query fails.
    pub async fn trips_since(
        &self,
        vehicle_id: &str,
        since: DateTime<Utc>,
    ) -> Result<TripLookup, ServiceError> {
        let trips = self
            .store
            .get_trips_since(vehicle_id, since)
            .await
            .map_err(|source| ServiceError::TripRead {
                vehicle_id: vehicle_id.to_string(),
                source,
            })?;

        tracing::debug!(vehicle_id, count = trips.len(), "Trips loaded");
        Ok(TripLookup::from_rows(trips))
    }

    /// Trips started within the 24 hours before now.
    ///
    /// # Errors
    ///
    /// See [`TripQuery::trips_since`].
    pub async fn trips_last_24h(&self, vehicle_id: &str) -> Result<TripLookup, ServiceError> {
        self.trips_last_24h_at(vehicle_id, Utc::now()).await
    }

    /// [`TripQuery::trips_last_24h`] relative to a fixed `now`.
    ///
    /// # Errors
    ///
    /// See [`TripQuery::trips_since`].
    pub async fn trips_last_24h_at(
        &self,
        vehicle_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TripLookup, ServiceError> {
        self.trips_since(vehicle_id, now - Duration::hours(24)).await
    }
}

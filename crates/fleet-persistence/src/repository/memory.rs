//! In-process store backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::traits::{TripRepository, VehicleRepository};
use crate::error::Result;
use fleet_domain::{TelemetryStatus, Trip, Vehicle};

/// [`FleetStore`](super::FleetStore) held in concurrent maps. Suitable for
/// local runs and as the base of test doubles; nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryFleetStore {
    vehicles: DashMap<String, Vehicle>,
    trips: DashMap<Uuid, Vec<Trip>>,
}

impl InMemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full vehicle row, including the plate.
    pub fn vehicle(&self, vehicle_id: &str) -> Option<Vehicle> {
        self.vehicles.get(vehicle_id).map(|v| v.clone())
    }

    /// Total trips across all vehicles.
    pub fn trip_count(&self) -> usize {
        self.trips.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl VehicleRepository for InMemoryFleetStore {
    async fn upsert_status(
        &self,
        vehicle_id: &str,
        plate_number: &str,
        status: &TelemetryStatus,
    ) -> Result<()> {
        self.vehicles
            .entry(vehicle_id.to_string())
            .and_modify(|vehicle| {
                vehicle.last_status = status.clone();
                // plate is write-once
                if vehicle.plate_number.is_empty() {
                    vehicle.plate_number = plate_number.to_string();
                }
            })
            .or_insert_with(|| Vehicle {
                id: vehicle_id.to_string(),
                plate_number: plate_number.to_string(),
                last_status: status.clone(),
            });
        Ok(())
    }

    async fn get_status(&self, vehicle_id: &str) -> Result<Option<TelemetryStatus>> {
        Ok(self
            .vehicles
            .get(vehicle_id)
            .map(|vehicle| vehicle.last_status.clone()))
    }

    async fn list_vehicle_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.vehicles.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl TripRepository for InMemoryFleetStore {
    async fn insert_trip(&self, trip: &Trip) -> Result<()> {
        self.trips
            .entry(trip.vehicle_id)
            .or_default()
            .push(trip.clone());
        Ok(())
    }

    async fn get_trips_since(&self, vehicle_id: &str, since: DateTime<Utc>) -> Result<Vec<Trip>> {
        let Ok(vehicle_uuid) = Uuid::parse_str(vehicle_id) else {
            return Ok(Vec::new());
        };

        let mut trips: Vec<Trip> = self
            .trips
            .get(&vehicle_uuid)
            .map(|log| {
                log.iter()
                    .filter(|trip| trip.start_time >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        trips.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(trips)
    }
}

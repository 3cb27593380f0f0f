//! ScyllaDB repository implementation.
//!
//! Expected tables (managed outside this crate):
//!
//! ```cql
//! CREATE TABLE vehicles (
//!     id           text PRIMARY KEY,
//!     plate_number text,
//!     last_status  text
//! );
//!
//! CREATE TABLE trips (
//!     vehicle_id uuid,
//!     start_time timestamp,
//!     id         uuid,
//!     end_time   timestamp,
//!     mileage    double,
//!     avg_speed  double,
//!     PRIMARY KEY ((vehicle_id), start_time, id)
//! ) WITH CLUSTERING ORDER BY (start_time DESC, id ASC);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::{Session, SessionBuilder};
use std::sync::Arc;
use uuid::Uuid;

use super::traits::{TripRepository, VehicleRepository};
use crate::error::{PersistenceError, Result};
use fleet_domain::{TelemetryStatus, Trip};

// =============================================================================
// SCYLLA CONFIGURATION
// =============================================================================

/// ScyllaDB connection configuration.
#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["localhost:9042".to_string()],
            keyspace: "fleet".to_string(),
            username: None,
            password: None,
        }
    }
}

// =============================================================================
// SCYLLA CLIENT
// =============================================================================

/// ScyllaDB client wrapper.
pub struct ScyllaClient {
    session: Arc<Session>,
    pub config: ScyllaConfig,
}

impl ScyllaClient {
    /// Create a new ScyllaDB client bound to the configured keyspace.
    pub async fn new(config: ScyllaConfig) -> Result<Self> {
        let mut builder = SessionBuilder::new().known_nodes(&config.hosts);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.user(user, pass);
        }

        let session = builder.build().await?;
        session.use_keyspace(config.keyspace.clone(), false).await?;

        Ok(Self {
            session: Arc::new(session),
            config,
        })
    }

    /// Get session reference.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

// =============================================================================
// FLEET STORE
// =============================================================================

type TripRow = (Uuid, Uuid, DateTime<Utc>, DateTime<Utc>, f64, f64);

/// Vehicle status and trip storage on ScyllaDB.
pub struct ScyllaFleetStore {
    client: Arc<ScyllaClient>,
}

impl ScyllaFleetStore {
    pub fn new(client: Arc<ScyllaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VehicleRepository for ScyllaFleetStore {
    async fn upsert_status(
        &self,
        vehicle_id: &str,
        plate_number: &str,
        status: &TelemetryStatus,
    ) -> Result<()> {
        let last_status = serde_json::to_string(status)?;
        let id = vehicle_id.to_string();

        // CQL UPDATE creates the row when it is missing
        self.client
            .session
            .query_unpaged(
                "UPDATE vehicles SET last_status = ? WHERE id = ?",
                (last_status, id.clone()),
            )
            .await?;

        // plate is write-once; a rejected condition is not an error
        if !plate_number.is_empty() {
            self.client
                .session
                .query_unpaged(
                    "UPDATE vehicles SET plate_number = ? WHERE id = ? IF plate_number = null",
                    (plate_number.to_string(), id),
                )
                .await?;
        }

        Ok(())
    }

    async fn get_status(&self, vehicle_id: &str) -> Result<Option<TelemetryStatus>> {
        let rows = self
            .client
            .session
            .query_unpaged(
                "SELECT last_status FROM vehicles WHERE id = ?",
                (vehicle_id.to_string(),),
            )
            .await?
            .into_rows_result()
            .map_err(PersistenceError::scylla)?;

        let row = rows
            .maybe_first_row::<(Option<String>,)>()
            .map_err(PersistenceError::scylla)?;

        match row {
            Some((Some(json),)) => Ok(Some(serde_json::from_str(&json)?)),
            _ => Ok(None),
        }
    }

    async fn list_vehicle_ids(&self) -> Result<Vec<String>> {
        let rows = self
            .client
            .session
            .query_unpaged("SELECT id FROM vehicles", ())
            .await?
            .into_rows_result()
            .map_err(PersistenceError::scylla)?;

        rows.rows::<(String,)>()
            .map_err(PersistenceError::scylla)?
            .map(|row| row.map(|(id,)| id).map_err(PersistenceError::scylla))
            .collect()
    }
}

#[async_trait]
impl TripRepository for ScyllaFleetStore {
    async fn insert_trip(&self, trip: &Trip) -> Result<()> {
        self.client
            .session
            .query_unpaged(
                r#"
                INSERT INTO trips (
                    vehicle_id, start_time, id, end_time, mileage, avg_speed
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
                (
                    trip.vehicle_id,
                    trip.start_time,
                    trip.id,
                    trip.end_time,
                    trip.mileage,
                    trip.avg_speed,
                ),
            )
            .await?;

        Ok(())
    }

    async fn get_trips_since(&self, vehicle_id: &str, since: DateTime<Utc>) -> Result<Vec<Trip>> {
        // trips.vehicle_id is a uuid column; other keys cannot have trips
        let Ok(vehicle_uuid) = Uuid::parse_str(vehicle_id) else {
            return Ok(Vec::new());
        };

        let rows = self
            .client
            .session
            .query_unpaged(
                r#"
                SELECT id, vehicle_id, start_time, end_time, mileage, avg_speed
                FROM trips
                WHERE vehicle_id = ? AND start_time >= ?
                "#,
                (vehicle_uuid, since),
            )
            .await?
            .into_rows_result()
            .map_err(PersistenceError::scylla)?;

        let mut trips = rows
            .rows::<TripRow>()
            .map_err(PersistenceError::scylla)?
            .map(|row| {
                row.map(|(id, vehicle_id, start_time, end_time, mileage, avg_speed)| Trip {
                    id,
                    vehicle_id,
                    start_time,
                    end_time,
                    mileage,
                    avg_speed,
                })
                .map_err(PersistenceError::scylla)
            })
            .collect::<Result<Vec<_>>>()?;

        // newest first is part of the TripRepository contract
        trips.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(trips)
    }
}

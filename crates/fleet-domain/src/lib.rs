//! # Fleet Tracker - Domain Model
//!
//! Vehicle, status and trip types shared by every layer: persistence,
//! the ingestion/query core, the simulator and the REST API.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Length of a derived trip: `start_time = timestamp - 60s`.
pub const DERIVED_TRIP_SPAN_SECS: i64 = 60;

/// Placeholder mileage recorded on every derived trip.
pub const DERIVED_TRIP_MILEAGE: f64 = 0.5;

/// Placeholder average speed recorded on every derived trip.
pub const DERIVED_TRIP_AVG_SPEED: f64 = 30.0;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Geographic position, carried on the wire as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Shift by the given offsets in degrees.
    #[must_use]
    pub fn offset(self, d_lat: f64, d_lon: f64) -> Self {
        Self::new(self.lat + d_lat, self.lon + d_lon)
    }
}

impl From<[f64; 2]> for Location {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Location> for [f64; 2] {
    fn from(loc: Location) -> Self {
        [loc.lat, loc.lon]
    }
}

/// Fully-specified latest state of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub location: Location,
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

/// Telemetry status as received from producers.
///
/// The fields the pipeline inspects are typed; everything else a producer
/// sends is kept in `extra` and round-trips untouched through store and
/// cache. `timestamp` stays a raw string so that a value which does not
/// parse is still persisted as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TelemetryStatus {
    /// True when the status carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.speed.is_none()
            && self.timestamp.is_none()
            && self.extra.is_empty()
    }

    /// The `timestamp` field as an RFC3339 instant, if present and valid.
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Strict view of this status when location, speed and a valid
    /// timestamp are all present.
    #[must_use]
    pub fn to_vehicle_status(&self) -> Option<VehicleStatus> {
        Some(VehicleStatus {
            location: self.location?,
            speed: self.speed?,
            timestamp: self.parsed_timestamp()?,
        })
    }
}

impl From<VehicleStatus> for TelemetryStatus {
    fn from(status: VehicleStatus) -> Self {
        Self {
            location: Some(status.location),
            speed: Some(status.speed),
            timestamp: Some(status.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
            extra: Map::new(),
        }
    }
}

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// One row per physical vehicle, created on first ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Opaque key; UUIDs in practice, but any non-empty string is storable.
    pub id: String,
    pub plate_number: String,
    pub last_status: TelemetryStatus,
}

/// Append-only trip record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub mileage: f64,
    pub avg_speed: f64,
}

impl Trip {
    /// Heuristic trip ending at `at`; marks that the vehicle reported,
    /// not how far it went.
    #[must_use]
    pub fn derived(vehicle_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            start_time: at - Duration::seconds(DERIVED_TRIP_SPAN_SECS),
            end_time: at,
            mileage: DERIVED_TRIP_MILEAGE,
            avg_speed: DERIVED_TRIP_AVG_SPEED,
        }
    }
}

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Transient ingestion input, from clients or the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestPayload {
    pub vehicle_id: String,

    #[serde(default)]
    pub plate_number: String,

    #[serde(default)]
    pub status: Option<TelemetryStatus>,
}

impl IngestPayload {
    pub fn new(vehicle_id: impl Into<String>, status: TelemetryStatus) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            plate_number: String::new(),
            status: Some(status),
        }
    }

    #[must_use]
    pub fn with_plate(mut self, plate_number: impl Into<String>) -> Self {
        self.plate_number = plate_number.into();
        self
    }

    /// Check the payload shape and return the status to persist.
    ///
    /// # Errors
    ///
    /// `InvalidPayload` when the vehicle id is empty or the status is
    /// missing or empty.
    pub fn validate(&self) -> Result<&TelemetryStatus, DomainError> {
        if self.vehicle_id.is_empty() {
            return Err(DomainError::InvalidPayload("vehicle_id is required".into()));
        }
        match &self.status {
            Some(status) if !status.is_empty() => Ok(status),
            _ => Err(DomainError::InvalidPayload("status is required".into())),
        }
    }
}

/// Body of the vehicle listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleIdList {
    pub vehicle_ids: Vec<String>,
}

/// Parse a vehicle identifier as a UUID.
///
/// # Errors
///
/// `InvalidVehicleId` naming the offending id.
pub fn parse_vehicle_id(id: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(id).map_err(|source| DomainError::InvalidVehicleId {
        id: id.to_string(),
        source,
    })
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid vehicle_id '{id}': {source}")]
    InvalidVehicleId {
        id: String,
        #[source]
        source: uuid::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};
    use serde_json::json;

    #[test]
    fn test_location_uses_array_wire_form() {
        let loc = Location::new(25.276_987, 55.296_249);
        assert_eq!(serde_json::to_value(loc).unwrap(), json!([25.276_987, 55.296_249]));

        let back: Location = serde_json::from_value(json!([1.5, -2.5])).unwrap();
        assert_eq!(back, Location::new(1.5, -2.5));
    }

    #[test]
    fn test_status_keeps_unknown_fields() {
        let raw = json!({
            "location": [25.2, 55.3],
            "speed": 60,
            "timestamp": "2024-05-01T10:00:00Z",
            "fuel": 0.75,
            "door": "open"
        });
        let status: TelemetryStatus = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(status.speed, Some(60.0));
        assert_eq!(status.extra.get("door"), Some(&json!("open")));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!({
            "location": [25.2, 55.3],
            "speed": 60.0,
            "timestamp": "2024-05-01T10:00:00Z",
            "fuel": 0.75,
            "door": "open"
        }));
    }

    #[test]
    fn test_empty_status_detection() {
        assert!(TelemetryStatus::default().is_empty());

        let only_extra: TelemetryStatus = serde_json::from_value(json!({"rpm": 900})).unwrap();
        assert!(!only_extra.is_empty());
    }

    #[test]
    fn test_timestamp_parsing() {
        let mut status = TelemetryStatus {
            timestamp: Some("2024-05-01T12:30:00+02:00".into()),
            ..TelemetryStatus::default()
        };
        let parsed = status.parsed_timestamp().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T10:30:00+00:00");

        status.timestamp = Some("yesterday".into());
        assert!(status.parsed_timestamp().is_none());

        status.timestamp = None;
        assert!(status.parsed_timestamp().is_none());
    }

    #[test]
    fn test_strict_view_needs_all_fields() {
        let full = VehicleStatus {
            location: Location::new(1.0, 2.0),
            speed: (40.0..70.0).fake(),
            timestamp: "2024-05-01T10:00:00Z".parse().unwrap(),
        };
        let loose = TelemetryStatus::from(full);
        assert_eq!(loose.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(loose.to_vehicle_status(), Some(full));

        let partial = TelemetryStatus { speed: Some(10.0), ..TelemetryStatus::default() };
        assert!(partial.to_vehicle_status().is_none());
    }

    #[test]
    fn test_derived_trip_spans_one_minute() {
        let vehicle_id = Uuid::new_v4();
        let at: DateTime<Utc> = "2024-05-01T10:00:00Z".parse().unwrap();
        let trip = Trip::derived(vehicle_id, at);

        assert_eq!(trip.vehicle_id, vehicle_id);
        assert_eq!(trip.end_time, at);
        assert_eq!(trip.end_time - trip.start_time, Duration::seconds(60));
        assert!(trip.start_time < trip.end_time);
        assert_eq!(trip.mileage, DERIVED_TRIP_MILEAGE);
        assert_eq!(trip.avg_speed, DERIVED_TRIP_AVG_SPEED);
    }

    #[test]
    fn test_payload_validation() {
        let status = TelemetryStatus { speed: Some(50.0), ..TelemetryStatus::default() };
        let plate: String = Faker.fake();

        let ok = IngestPayload::new(Uuid::new_v4().to_string(), status.clone()).with_plate(plate);
        assert!(ok.validate().is_ok());

        let no_id = IngestPayload::new("", status);
        assert!(matches!(no_id.validate(), Err(DomainError::InvalidPayload(_))));

        let empty_status = IngestPayload::new("v-1", TelemetryStatus::default());
        assert!(matches!(empty_status.validate(), Err(DomainError::InvalidPayload(_))));

        let missing: IngestPayload = serde_json::from_value(json!({"vehicle_id": "v-1"})).unwrap();
        assert_eq!(missing.plate_number, "");
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_vehicle_id_parsing_names_the_id() {
        assert!(parse_vehicle_id(&Uuid::new_v4().to_string()).is_ok());

        let err = parse_vehicle_id("truck-42").unwrap_err();
        assert!(err.to_string().contains("truck-42"));
    }
}

//! Synthetic status generation.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};

use fleet_domain::{IngestPayload, Location, TelemetryStatus, VehicleStatus};

/// Centre every simulated position is jittered around (Dubai).
pub const BASE_LOCATION: Location = Location::new(25.276_987, 55.296_249);

/// Maximum offset in degrees applied to each coordinate.
pub const LOCATION_JITTER_DEG: f64 = 0.001;

/// Simulated speeds are drawn from `[MIN_SPEED, MAX_SPEED)`.
pub const MIN_SPEED: f64 = 40.0;
pub const MAX_SPEED: f64 = 70.0;

/// Jittered status generator. One per simulator; not shared across tasks.
#[derive(Debug)]
pub struct TelemetryGenerator {
    base: Location,
    rng: StdRng,
    jitter: Uniform<f64>,
    speed: Uniform<f64>,
}

impl TelemetryGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            base: BASE_LOCATION,
            rng,
            jitter: Uniform::new_inclusive(-LOCATION_JITTER_DEG, LOCATION_JITTER_DEG),
            speed: Uniform::new(MIN_SPEED, MAX_SPEED),
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: Location) -> Self {
        self.base = base;
        self
    }

    pub fn next_status(&mut self, at: DateTime<Utc>) -> VehicleStatus {
        let d_lat = self.jitter.sample(&mut self.rng);
        let d_lon = self.jitter.sample(&mut self.rng);

        VehicleStatus {
            location: self.base.offset(d_lat, d_lon),
            speed: self.speed.sample(&mut self.rng),
            timestamp: at,
        }
    }

    /// Payload for `vehicle_id` as a telemetry client would send it: no plate,
    /// RFC3339 timestamp at second precision.
    pub fn next_payload(&mut self, vehicle_id: &str, at: DateTime<Utc>) -> IngestPayload {
        IngestPayload::new(vehicle_id, TelemetryStatus::from(self.next_status(at)))
    }
}

impl Default for TelemetryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

//! Status cache key and value format.

use fleet_domain::TelemetryStatus;

/// Cache key holding a vehicle's latest status.
pub fn status_cache_key(vehicle_id: &str) -> String {
    format!("vehicle:{vehicle_id}:status")
}

pub(crate) fn encode_status(status: &TelemetryStatus) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(status)
}

pub(crate) fn decode_status(bytes: &[u8]) -> serde_json::Result<TelemetryStatus> {
    serde_json::from_slice(bytes)
}

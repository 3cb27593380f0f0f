//! Degraded-but-successful outcomes.

use thiserror::Error;
use uuid::Uuid;

use fleet_persistence::{CacheError, ReadWarning};

/// Best-effort step that failed without failing its operation.
///
/// Every soft error is also logged at `warn` where it happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoftError {
    #[error("cache read failed for {key}: {reason}")]
    CacheRead { key: String, reason: String },

    #[error("malformed cache entry at {key}: {reason}")]
    MalformedCacheEntry { key: String, reason: String },

    #[error("cache write failed for {key}: {reason}")]
    CacheWrite { key: String, reason: String },

    #[error("status could not be encoded for caching: {reason}")]
    StatusEncode { reason: String },

    #[error("trip {trip_id} was not recorded: {reason}")]
    TripInsert { trip_id: Uuid, reason: String },
}

impl SoftError {
    pub(crate) fn from_read_warning(key: &str, warning: &ReadWarning) -> Self {
        let key = key.to_string();
        match warning {
            ReadWarning::CacheRead(CacheError::Malformed(e)) => Self::MalformedCacheEntry {
                key,
                reason: e.to_string(),
            },
            ReadWarning::CacheRead(CacheError::Backend(e)) => Self::CacheRead {
                key,
                reason: e.to_string(),
            },
            ReadWarning::CachePopulate(e) => Self::CacheWrite {
                key,
                reason: e.to_string(),
            },
        }
    }
}

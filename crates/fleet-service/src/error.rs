//! Service error types

use fleet_domain::DomainError;
use fleet_persistence::{PersistenceError, ReadError};
use thiserror::Error;

/// Failures that end a core operation.
///
/// Cache and trip-bookkeeping trouble is never reported here; see
/// [`SoftError`](crate::SoftError).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("failed to store status for vehicle {vehicle_id}: {source}")]
    StatusWrite {
        vehicle_id: String,
        #[source]
        source: PersistenceError,
    },

    #[error("failed to read status for vehicle {vehicle_id}: {source}")]
    StatusRead {
        vehicle_id: String,
        #[source]
        source: ReadError,
    },

    #[error("failed to read trips for vehicle {vehicle_id}: {source}")]
    TripRead {
        vehicle_id: String,
        #[source]
        source: PersistenceError,
    },

    #[error("failed to list vehicles: {0}")]
    VehicleList(#[source] PersistenceError),
}

impl ServiceError {
    /// True for caller mistakes (bad payload, bad id), as opposed to
    /// backend failures.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

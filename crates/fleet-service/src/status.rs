//! Cache-aside status reads.

use fleet_domain::TelemetryStatus;
use fleet_persistence::{CacheError, DbError, ReadSource, ReadStrategy, SharedCache, SharedStore};

use crate::cache_entry::{decode_status, encode_status, status_cache_key};
use crate::error::ServiceError;
use crate::soft_error::SoftError;
use crate::STATUS_CACHE_TTL;

/// Answer to a status query.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLookup {
    /// `None` when neither cache nor store knows the vehicle.
    pub status: Option<TelemetryStatus>,
    pub source: ReadSource,
    pub soft_errors: Vec<SoftError>,
}

impl StatusLookup {
    pub const fn found(&self) -> bool {
        self.status.is_some()
    }
}

/// Latest-status reader over the cache and the store.
#[derive(Clone)]
pub struct StatusReader {
    store: SharedStore,
    cache: SharedCache,
    strategy: ReadStrategy,
}

impl StatusReader {
    pub fn new(store: SharedStore, cache: SharedCache, strategy: ReadStrategy) -> Self {
        Self {
            store,
            cache,
            strategy,
        }
    }

    pub const fn strategy(&self) -> ReadStrategy {
        self.strategy
    }

    /// Latest status of `vehicle_id`.
    ///
    /// With [`ReadStrategy::CacheFirst`] a decodable cache entry is returned
    /// without touching the store. A missing, malformed or unreachable entry
    /// falls through to the store, whose answer is written back with the
    /// status TTL.
    ///
    /// # Errors
    ///
    /// Only a store failure; cache trouble ends up in `soft_errors`.
    pub async fn get_status(&self, vehicle_id: &str) -> Result<StatusLookup, ServiceError> {
        let key = status_cache_key(vehicle_id);
        let key_ref = key.as_str();
        let cache = &self.cache;
        let store = &self.store;

        let outcome = self
            .strategy
            .read(
                move || async move {
                    match cache.get(key_ref).await {
                        Ok(Some(bytes)) => match decode_status(&bytes) {
                            Ok(status) => Ok(Some(status)),
                            Err(e) => Err(CacheError::malformed(e)),
                        },
                        Ok(None) => Ok(None),
                        Err(e) => Err(CacheError::backend(e)),
                    }
                },
                move || async move {
                    store
                        .get_status(vehicle_id)
                        .await
                        .map_err(|e| DbError(Box::new(e)))
                },
                Some(move |status: TelemetryStatus| async move {
                    match encode_status(&status) {
                        Ok(bytes) => cache
                            .set(key_ref, &bytes, STATUS_CACHE_TTL)
                            .await
                            .map_err(CacheError::backend),
                        Err(e) => Err(CacheError::malformed(e)),
                    }
                }),
            )
            .await
            .map_err(|source| ServiceError::StatusRead {
                vehicle_id: vehicle_id.to_string(),
                source,
            })?;

        let soft_errors = outcome
            .warnings
            .iter()
            .map(|warning| SoftError::from_read_warning(&key, warning))
            .collect();

        Ok(StatusLookup {
            status: outcome.value,
            source: outcome.source,
            soft_errors,
        })
    }
}

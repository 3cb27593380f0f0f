//! Telemetry ingestion: the single write path for real and simulated
//! status updates.

use fleet_domain::{IngestPayload, TelemetryStatus, Trip, parse_vehicle_id};
use fleet_persistence::{SharedCache, SharedStore};

use crate::cache_entry::{encode_status, status_cache_key};
use crate::error::ServiceError;
use crate::soft_error::SoftError;
use crate::STATUS_CACHE_TTL;

/// What a successful ingestion did beyond storing the status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Trip recorded for this update, if the status had a valid timestamp
    /// and the insert went through.
    pub trip: Option<Trip>,
    /// Best-effort steps that failed.
    pub soft_errors: Vec<SoftError>,
}

impl IngestReport {
    pub fn is_degraded(&self) -> bool {
        !self.soft_errors.is_empty()
    }
}

/// Validates, persists, derives a trip and refreshes the status cache.
#[derive(Clone)]
pub struct IngestionPipeline {
    store: SharedStore,
    cache: SharedCache,
}

impl IngestionPipeline {
    pub fn new(store: SharedStore, cache: SharedCache) -> Self {
        Self { store, cache }
    }

    /// Ingest one telemetry update.
    ///
    /// Status persistence and id validation are mandatory; trip bookkeeping
    /// and the cache refresh are best-effort and reported in the
    /// [`IngestReport`].
    ///
    /// A non-UUID `vehicle_id` fails the call *after* the status has been
    /// stored.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty id or status, or a non-UUID id;
    /// `StatusWrite` when the store rejects the status.
    pub async fn ingest(&self, payload: &IngestPayload) -> Result<IngestReport, ServiceError> {
        let status = payload.validate()?;
        let vehicle_id = payload.vehicle_id.as_str();

        self.store
            .upsert_status(vehicle_id, &payload.plate_number, status)
            .await
            .map_err(|source| ServiceError::StatusWrite {
                vehicle_id: vehicle_id.to_string(),
                source,
            })?;

        let vehicle_uuid = parse_vehicle_id(vehicle_id).inspect_err(|_| {
            tracing::warn!(vehicle_id, "Status stored for non-UUID vehicle id; skipping trip");
        })?;

        let mut report = IngestReport::default();

        if let Some(at) = status.parsed_timestamp() {
            let trip = Trip::derived(vehicle_uuid, at);
            match self.store.insert_trip(&trip).await {
                Ok(()) => report.trip = Some(trip),
                Err(e) => {
                    tracing::warn!(vehicle_id, trip_id = %trip.id, error = %e, "Failed to record trip");
                    report.soft_errors.push(SoftError::TripInsert {
                        trip_id: trip.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Err(soft) = self.refresh_cache(vehicle_id, status).await {
            report.soft_errors.push(soft);
        }

        tracing::debug!(
            vehicle_id,
            trip = report.trip.is_some(),
            degraded = report.is_degraded(),
            "Telemetry ingested"
        );

        Ok(report)
    }

    async fn refresh_cache(&self, vehicle_id: &str, status: &TelemetryStatus) -> Result<(), SoftError> {
        let key = status_cache_key(vehicle_id);

        let bytes = encode_status(status).map_err(|e| {
            tracing::warn!(key = %key, error = %e, "Failed to encode status for cache");
            SoftError::StatusEncode { reason: e.to_string() }
        })?;

        self.cache
            .set(&key, &bytes, STATUS_CACHE_TTL)
            .await
            .map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Cache set failed");
                SoftError::CacheWrite {
                    reason: e.to_string(),
                    key: key.clone(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_persistence::{StatusCache, TripRepository, VehicleRepository};
    use crate::testing::{CountingCache, CountingStore};
    use chrono::{DateTime, Duration, Utc};
    use fake::{Fake, Faker};
    use fleet_domain::Location;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use tokio_test::{assert_err, assert_ok};
    use uuid::Uuid;

    fn pipeline(store: &Arc<CountingStore>, cache: &Arc<CountingCache>) -> IngestionPipeline {
        IngestionPipeline::new(store.clone(), cache.clone())
    }

    fn status_at(timestamp: Option<&str>) -> TelemetryStatus {
        TelemetryStatus {
            location: Some(Location::new(25.2, 55.3)),
            speed: Some((40.0..70.0).fake()),
            timestamp: timestamp.map(str::to_string),
            ..TelemetryStatus::default()
        }
    }

    async fn trips_of(store: &CountingStore, vehicle_id: &str) -> Vec<Trip> {
        store
            .inner
            .get_trips_since(vehicle_id, DateTime::<Utc>::MIN_UTC)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_stores_status_trip_and_cache() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CountingCache::default());
        let id = Uuid::new_v4().to_string();
        let plate: String = Faker.fake();
        let status = status_at(Some("2024-05-01T10:00:00Z"));

        let report = assert_ok!(
            pipeline(&store, &cache)
                .ingest(&IngestPayload::new(&id, status.clone()).with_plate(plate.clone()))
                .await
        );

        assert!(!report.is_degraded());
        assert_eq!(store.inner.vehicle(&id).unwrap().plate_number, plate);
        assert_eq!(store.inner.get_status(&id).await.unwrap(), Some(status.clone()));

        let trip = report.trip.unwrap();
        let at: DateTime<Utc> = "2024-05-01T10:00:00Z".parse().unwrap();
        assert_eq!(trip.end_time, at);
        assert_eq!(trip.start_time, at - Duration::minutes(1));
        assert_eq!(trips_of(&store, &id).await, vec![trip]);

        let cached = cache.inner.get(&status_cache_key(&id)).await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<TelemetryStatus>(&cached).unwrap(), status);
    }

    #[tokio::test]
    async fn test_rejects_empty_payload_before_any_io() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CountingCache::default());
        let pipeline = pipeline(&store, &cache);

        let no_id = IngestPayload::new("", status_at(None));
        let empty_status = IngestPayload::new(Uuid::new_v4().to_string(), TelemetryStatus::default());
        let missing_status = IngestPayload {
            status: None,
            ..IngestPayload::new(Uuid::new_v4().to_string(), status_at(None))
        };

        for payload in [no_id, empty_status, missing_status] {
            let err = assert_err!(pipeline.ingest(&payload).await);
            assert!(err.is_validation());
        }

        assert_eq!(store.total_calls(), 0);
        assert_eq!(cache.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_uuid_id_persists_status_but_fails() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CountingCache::default());
        let status = status_at(Some("2024-05-01T10:00:00Z"));

        let err = assert_err!(
            pipeline(&store, &cache)
                .ingest(&IngestPayload::new("truck-42", status.clone()))
                .await
        );

        assert!(err.is_validation());
        assert!(err.to_string().contains("truck-42"));
        assert_eq!(store.inner.get_status("truck-42").await.unwrap(), Some(status));
        assert_eq!(CountingStore::calls(&store.trip_inserts), 0);
        assert_eq!(CountingStore::calls(&cache.sets), 0);
    }

    #[tokio::test]
    async fn test_missing_or_bad_timestamp_records_no_trip() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CountingCache::default());
        let pipeline = pipeline(&store, &cache);
        let id = Uuid::new_v4().to_string();

        for ts in [None, Some("not-a-time"), Some("2024-05-01 10:00:00")] {
            let report = assert_ok!(pipeline.ingest(&IngestPayload::new(&id, status_at(ts))).await);
            assert!(report.trip.is_none());
            assert!(!report.is_degraded());
        }

        assert_eq!(CountingStore::calls(&store.trip_inserts), 0);
        assert!(trips_of(&store, &id).await.is_empty());
        // unparseable timestamps are still stored verbatim
        let stored = store.inner.get_status(&id).await.unwrap().unwrap();
        assert_eq!(stored.timestamp.as_deref(), Some("2024-05-01 10:00:00"));
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal_and_skips_the_rest() {
        let store = Arc::new(CountingStore::default());
        store.fail_upsert.store(true, Ordering::SeqCst);
        let cache = Arc::new(CountingCache::default());

        let err = assert_err!(
            pipeline(&store, &cache)
                .ingest(&IngestPayload::new(Uuid::new_v4().to_string(), status_at(Some("2024-05-01T10:00:00Z"))))
                .await
        );

        assert!(matches!(err, ServiceError::StatusWrite { .. }));
        assert_eq!(CountingStore::calls(&store.trip_inserts), 0);
        assert_eq!(cache.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_trip_insert_failure_is_soft() {
        let store = Arc::new(CountingStore::default());
        store.fail_trip_insert.store(true, Ordering::SeqCst);
        let cache = Arc::new(CountingCache::default());
        let id = Uuid::new_v4().to_string();

        let report = assert_ok!(
            pipeline(&store, &cache)
                .ingest(&IngestPayload::new(&id, status_at(Some("2024-05-01T10:00:00Z"))))
                .await
        );

        assert!(report.trip.is_none());
        assert!(matches!(report.soft_errors.as_slice(), [SoftError::TripInsert { .. }]));
        // cache refresh still happens
        assert!(cache.inner.get(&status_cache_key(&id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreachable_cache_does_not_fail_ingest() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CountingCache::unreachable());
        let id = Uuid::new_v4().to_string();

        let report = assert_ok!(
            pipeline(&store, &cache)
                .ingest(&IngestPayload::new(&id, status_at(Some("2024-05-01T10:00:00Z"))))
                .await
        );

        assert!(report.trip.is_some());
        assert_eq!(
            report.soft_errors,
            vec![SoftError::CacheWrite {
                key: status_cache_key(&id),
                reason: "Backend unavailable: cache set disabled by test".into(),
            }]
        );
        assert!(store.inner.get_status(&id).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_leave_one_consistent_value() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CountingCache::default());
        let pipeline = pipeline(&store, &cache);
        let id = Uuid::new_v4().to_string();

        let writers: Vec<_> = (0..32)
            .map(|i| {
                let pipeline = pipeline.clone();
                let payload = IngestPayload::new(
                    &id,
                    TelemetryStatus {
                        speed: Some(f64::from(i)),
                        timestamp: Some(Utc::now().to_rfc3339()),
                        ..TelemetryStatus::default()
                    },
                );
                tokio::spawn(async move { pipeline.ingest(&payload).await })
            })
            .collect();

        for writer in writers {
            assert_ok!(writer.await.unwrap());
        }

        // last write wins independently at store and cache; both must hold
        // one of the written values, intact
        let stored = store.inner.get_status(&id).await.unwrap().unwrap();
        let cached: TelemetryStatus = serde_json::from_slice(
            &cache.inner.get(&status_cache_key(&id)).await.unwrap().unwrap(),
        )
        .unwrap();
        assert!((0.0..32.0).contains(&stored.speed.unwrap()));
        assert!((0.0..32.0).contains(&cached.speed.unwrap()));
        assert_eq!(trips_of(&store, &id).await.len(), 32);
    }
}

//! Counting and failure-injecting doubles for the store and cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use fleet_domain::{TelemetryStatus, Trip};
use fleet_persistence::{
    InMemoryCache, InMemoryFleetStore, PersistenceError, Result, StatusCache, TripRepository,
    VehicleRepository,
};

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

fn fail_if(flag: &AtomicBool, what: &str) -> Result<()> {
    if flag.load(Ordering::SeqCst) {
        Err(PersistenceError::Unavailable(format!("{what} disabled by test")))
    } else {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: InMemoryFleetStore,
    pub upserts: AtomicUsize,
    pub status_reads: AtomicUsize,
    pub trip_inserts: AtomicUsize,
    pub trip_reads: AtomicUsize,
    pub id_listings: AtomicUsize,
    pub fail_upsert: AtomicBool,
    pub fail_status_read: AtomicBool,
    pub fail_trip_insert: AtomicBool,
}

impl CountingStore {
    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        [
            &self.upserts,
            &self.status_reads,
            &self.trip_inserts,
            &self.trip_reads,
            &self.id_listings,
        ]
        .into_iter()
        .map(Self::calls)
        .sum()
    }
}

#[async_trait]
impl VehicleRepository for CountingStore {
    async fn upsert_status(
        &self,
        vehicle_id: &str,
        plate_number: &str,
        status: &TelemetryStatus,
    ) -> Result<()> {
        bump(&self.upserts);
        fail_if(&self.fail_upsert, "upsert")?;
        self.inner.upsert_status(vehicle_id, plate_number, status).await
    }

    async fn get_status(&self, vehicle_id: &str) -> Result<Option<TelemetryStatus>> {
        bump(&self.status_reads);
        fail_if(&self.fail_status_read, "status read")?;
        self.inner.get_status(vehicle_id).await
    }

    async fn list_vehicle_ids(&self) -> Result<Vec<String>> {
        bump(&self.id_listings);
        self.inner.list_vehicle_ids().await
    }
}

#[async_trait]
impl TripRepository for CountingStore {
    async fn insert_trip(&self, trip: &Trip) -> Result<()> {
        bump(&self.trip_inserts);
        fail_if(&self.fail_trip_insert, "trip insert")?;
        self.inner.insert_trip(trip).await
    }

    async fn get_trips_since(&self, vehicle_id: &str, since: DateTime<Utc>) -> Result<Vec<Trip>> {
        bump(&self.trip_reads);
        self.inner.get_trips_since(vehicle_id, since).await
    }
}

#[derive(Debug, Default)]
pub struct CountingCache {
    pub inner: InMemoryCache,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
}

impl CountingCache {
    /// A cache whose every call fails, as if Redis were down.
    pub fn unreachable() -> Self {
        let cache = Self::default();
        cache.fail_get.store(true, Ordering::SeqCst);
        cache.fail_set.store(true, Ordering::SeqCst);
        cache
    }

    pub fn total_calls(&self) -> usize {
        CountingStore::calls(&self.gets) + CountingStore::calls(&self.sets)
    }
}

#[async_trait]
impl StatusCache for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        bump(&self.gets);
        fail_if(&self.fail_get, "cache get")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        bump(&self.sets);
        fail_if(&self.fail_set, "cache set")?;
        self.inner.set(key, value, ttl).await
    }
}

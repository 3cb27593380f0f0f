//! # Fleet Persistence Library
//!
//! Store and cache adapters for the fleet tracker.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Ingestion pipeline / status reader                │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                        │
//!                    ▼                        ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │   StatusCache (bytes)   │   │   FleetStore                 │
//! │   Redis / in-memory     │   │   (Vehicle + Trip repos)     │
//! │   vehicle:<id>:status   │   │   ScyllaDB / in-memory       │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! The cache speaks raw bytes with a TTL; (de)serialization of statuses is
//! the caller's job. [`ReadStrategy`] composes the two sides for reads.
//!
//! ## Features
//!
//! - `scylla`: Enable the ScyllaDB store (default)
//! - `redis`: Enable the Redis cache (default)
//!
//! The in-memory adapters are always available.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod repository;
pub mod strategy;

// Re-export commonly used types
#[cfg(feature = "redis")]
pub use cache::{CacheClient, CacheConfig};
pub use cache::{InMemoryCache, SharedCache, StatusCache};
pub use error::{PersistenceError, Result};
#[cfg(feature = "scylla")]
pub use repository::{ScyllaClient, ScyllaConfig, ScyllaFleetStore};
pub use repository::{FleetStore, InMemoryFleetStore, SharedStore, TripRepository, VehicleRepository};
pub use strategy::{CacheError, DbError, ReadError, ReadOutcome, ReadSource, ReadStrategy, ReadWarning};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

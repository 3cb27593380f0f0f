//! # Repository Module
//!
//! Repository pattern implementations for vehicle status and trip persistence.

pub mod memory;
#[cfg(feature = "scylla")]
pub mod scylla_impl;
pub mod traits;

pub use memory::InMemoryFleetStore;
#[cfg(feature = "scylla")]
pub use scylla_impl::{ScyllaClient, ScyllaConfig, ScyllaFleetStore};
pub use traits::{FleetStore, SharedStore, TripRepository, VehicleRepository};

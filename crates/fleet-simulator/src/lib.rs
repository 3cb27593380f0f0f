//! # Fleet Simulator
//!
//! Background telemetry generator that drives the ingestion path the same
//! way real clients do, for every known vehicle, every two seconds.
//!
//! ## Features
//!
//! - Jittered positions around a fixed base coordinate, speeds in 40-70
//! - In-process sink sharing the API's [`FleetService`](fleet_service::FleetService)
//! - HTTP sink for load-testing a running API
//! - Cooperative cancellation that interrupts the inter-sweep pause

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod runner;
pub mod sink;
pub mod telemetry;

pub use runner::{SWEEP_INTERVAL, Simulator, SimulatorExit, SimulatorHandle, SimulatorState};
pub use sink::{DryRunSink, HttpSink, SinkError, TelemetrySink};
pub use telemetry::TelemetryGenerator;

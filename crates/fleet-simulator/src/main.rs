//! Fleet Simulator CLI
//!
//! Drives a running fleet API with synthetic telemetry over HTTP.

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use fleet_simulator::{DryRunSink, HttpSink, Simulator, SimulatorExit, TelemetryGenerator, TelemetrySink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fleet-simulator")]
#[command(about = "Stream synthetic vehicle telemetry into the fleet API")]
struct Args {
    /// API base URL
    #[arg(long, env = "FLEET_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Vehicle id to simulate (repeatable); defaults to every vehicle the API knows
    #[arg(long = "vehicle")]
    vehicles: Vec<String>,

    /// Stop after this many sweeps
    #[arg(long)]
    sweeps: Option<u64>,

    /// RNG seed for reproducible telemetry
    #[arg(long)]
    seed: Option<u64>,

    /// Dry run (log payloads instead of posting them)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fleet_simulator=info".parse()?))
        .init();

    let args = Args::parse();

    let sink: Arc<dyn TelemetrySink> = if args.dry_run {
        if args.vehicles.is_empty() {
            bail!("--dry-run needs at least one --vehicle");
        }
        Arc::new(DryRunSink::new(args.vehicles.clone()))
    } else if args.vehicles.is_empty() {
        Arc::new(HttpSink::new(&args.api_url))
    } else {
        Arc::new(FixedVehicles {
            vehicle_ids: args.vehicles.clone(),
            inner: HttpSink::new(&args.api_url),
        })
    };

    let generator = args
        .seed
        .map_or_else(TelemetryGenerator::new, TelemetryGenerator::seeded);

    let mut simulator = Simulator::new(sink).with_generator(generator);
    if let Some(sweeps) = args.sweeps {
        simulator = simulator.with_max_sweeps(sweeps);
    }

    info!(api = %args.api_url, dry_run = args.dry_run, sweeps = ?args.sweeps, "Starting simulator");
    let mut handle = simulator.start();

    // the task ends on its own at the sweep bound or when enumeration fails
    let ended_on_its_own = tokio::select! {
        () = handle.stopped() => true,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            false
        }
    };

    let exit = if ended_on_its_own {
        handle.join().await?
    } else {
        info!("Received Ctrl+C, stopping simulator");
        handle.shutdown().await?
    };

    match exit {
        SimulatorExit::EnumerationFailed => bail!("could not enumerate vehicles from {}", args.api_url),
        SimulatorExit::Cancelled { sweeps } | SimulatorExit::Finished { sweeps } => {
            if sweeps == 0 {
                warn!("No sweep completed");
            }
            info!(sweeps, "Simulation complete");
        }
    }

    Ok(())
}

/// HTTP sink with a vehicle list given on the command line.
struct FixedVehicles {
    vehicle_ids: Vec<String>,
    inner: HttpSink,
}

#[async_trait::async_trait]
impl TelemetrySink for FixedVehicles {
    async fn vehicle_ids(&self) -> Result<Vec<String>, fleet_simulator::SinkError> {
        Ok(self.vehicle_ids.clone())
    }

    async fn submit(
        &self,
        payload: &fleet_domain::IngestPayload,
    ) -> Result<(), fleet_simulator::SinkError> {
        self.inner.submit(payload).await
    }
}

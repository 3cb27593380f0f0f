//! The background simulator task and its lifecycle.
//!
//! ```text
//!   Simulator ──start()──▶ SimulatorHandle ──shutdown()──▶ SimulatorExit
//!     Idle                   Running                         Stopped
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::sink::TelemetrySink;
use crate::telemetry::TelemetryGenerator;

/// Pause between two full sweeps over the vehicle list.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    Idle,
    Running,
    Stopped,
}

/// Why the simulator task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorExit {
    /// Cancellation observed after `sweeps` complete sweeps.
    Cancelled { sweeps: u64 },
    /// The configured sweep bound was reached.
    Finished { sweeps: u64 },
    /// Vehicle enumeration failed; no sweep was run.
    EnumerationFailed,
}

/// Unstarted simulator.
pub struct Simulator {
    sink: Arc<dyn TelemetrySink>,
    generator: TelemetryGenerator,
    max_sweeps: Option<u64>,
}

impl Simulator {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            sink,
            generator: TelemetryGenerator::new(),
            max_sweeps: None,
        }
    }

    #[must_use]
    pub fn with_generator(mut self, generator: TelemetryGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Stop on its own after `sweeps` sweeps instead of running until
    /// cancelled.
    #[must_use]
    pub fn with_max_sweeps(mut self, sweeps: u64) -> Self {
        self.max_sweeps = Some(sweeps);
        self
    }

    pub const fn state(&self) -> SimulatorState {
        SimulatorState::Idle
    }

    /// Spawn the simulator onto the current runtime.
    ///
    /// Dropping the returned handle cancels the task the same way
    /// [`SimulatorHandle::cancel`] does.
    pub fn start(self) -> SimulatorHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SimulatorState::Running);

        let task = tokio::spawn(async move {
            let exit = self.run(cancel_rx).await;
            state_tx.send_replace(SimulatorState::Stopped);
            tracing::info!(?exit, "Simulator stopped");
            exit
        });

        SimulatorHandle {
            cancel: cancel_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(mut self, mut cancel: watch::Receiver<bool>) -> SimulatorExit {
        let vehicle_ids = match self.sink.vehicle_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to enumerate vehicles, simulator not started");
                return SimulatorExit::EnumerationFailed;
            }
        };

        tracing::info!(vehicles = vehicle_ids.len(), "Simulator running");

        let mut sweeps = 0;
        loop {
            if *cancel.borrow() {
                return SimulatorExit::Cancelled { sweeps };
            }

            for vehicle_id in &vehicle_ids {
                if *cancel.borrow() {
                    return SimulatorExit::Cancelled { sweeps };
                }

                let payload = self.generator.next_payload(vehicle_id, Utc::now());
                if let Err(e) = self.sink.submit(&payload).await {
                    tracing::warn!(vehicle_id = %vehicle_id, error = %e, "Simulated ingest failed");
                }
            }

            sweeps += 1;
            tracing::debug!(sweep = sweeps, "Sweep complete");

            if self.max_sweeps.is_some_and(|max| sweeps >= max) {
                return SimulatorExit::Finished { sweeps };
            }

            tokio::select! {
                () = tokio::time::sleep(SWEEP_INTERVAL) => {}
                changed = cancel.changed() => {
                    // sender gone: the handle was dropped
                    if changed.is_err() {
                        return SimulatorExit::Cancelled { sweeps };
                    }
                }
            }
        }
    }
}

/// A started simulator.
#[derive(Debug)]
pub struct SimulatorHandle {
    cancel: watch::Sender<bool>,
    state: watch::Receiver<SimulatorState>,
    task: JoinHandle<SimulatorExit>,
}

impl SimulatorHandle {
    pub fn state(&self) -> SimulatorState {
        *self.state.borrow()
    }

    /// Resolves once the task has stopped, whatever the reason. Leaves the
    /// handle usable, so it can be raced against other events and then
    /// joined.
    pub async fn stopped(&mut self) {
        // an error means the task is gone without reporting; also stopped
        let _ = self
            .state
            .wait_for(|state| *state == SimulatorState::Stopped)
            .await;
    }

    /// Raise the cancellation signal without waiting.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Cancel and wait for the task. Returns within one sweep interval
    /// plus whatever ingest call is in flight.
    ///
    /// # Errors
    ///
    /// The task panicked or was aborted.
    pub async fn shutdown(self) -> Result<SimulatorExit, JoinError> {
        self.cancel();
        self.task.await
    }

    /// Wait for the task to end on its own.
    ///
    /// # Errors
    ///
    /// The task panicked or was aborted.
    pub async fn join(self) -> Result<SimulatorExit, JoinError> {
        // holding the sender keeps the task from seeing a dropped handle
        let Self { cancel, task, .. } = self;
        let exit = task.await;
        drop(cancel);
        exit
    }
}

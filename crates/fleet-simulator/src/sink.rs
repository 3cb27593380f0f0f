//! Where simulated telemetry goes.

use async_trait::async_trait;
use thiserror::Error;

use fleet_domain::{IngestPayload, VehicleIdList};
use fleet_service::{FleetService, ServiceError};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API rejected request with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Ingestion target the simulator drives.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Vehicles to simulate, read once when the simulator starts.
    async fn vehicle_ids(&self) -> Result<Vec<String>, SinkError>;

    async fn submit(&self, payload: &IngestPayload) -> Result<(), SinkError>;
}

/// In-process: the simulator shares the service with request handlers.
#[async_trait]
impl TelemetrySink for FleetService {
    async fn vehicle_ids(&self) -> Result<Vec<String>, SinkError> {
        Ok(self.list_vehicle_ids().await?)
    }

    async fn submit(&self, payload: &IngestPayload) -> Result<(), SinkError> {
        self.ingest(payload).await?;
        Ok(())
    }
}

/// Remote: posts to a running fleet API.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, SinkError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected { status, body })
    }
}

#[async_trait]
impl TelemetrySink for HttpSink {
    async fn vehicle_ids(&self) -> Result<Vec<String>, SinkError> {
        let response = self.client.get(self.url("/api/vehicles")).send().await?;
        let list: VehicleIdList = Self::check_response(response).await?.json().await?;
        Ok(list.vehicle_ids)
    }

    async fn submit(&self, payload: &IngestPayload) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.url("/api/vehicle/ingest"))
            .json(payload)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

/// Logs payloads instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct DryRunSink {
    vehicle_ids: Vec<String>,
}

impl DryRunSink {
    pub const fn new(vehicle_ids: Vec<String>) -> Self {
        Self { vehicle_ids }
    }
}

#[async_trait]
impl TelemetrySink for DryRunSink {
    async fn vehicle_ids(&self) -> Result<Vec<String>, SinkError> {
        Ok(self.vehicle_ids.clone())
    }

    async fn submit(&self, payload: &IngestPayload) -> Result<(), SinkError> {
        let status = serde_json::to_string(&payload.status).unwrap_or_default();
        tracing::info!(vehicle_id = %payload.vehicle_id, %status, "Dry run: would ingest");
        Ok(())
    }
}

//! REST handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fleet_domain::{IngestPayload, TelemetryStatus, Trip, VehicleIdList};
use fleet_service::TripLookup;

use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct VehicleQuery {
    pub vehicle_id: Option<String>,
}

impl VehicleQuery {
    fn vehicle_id(self) -> ApiResult<String> {
        self.vehicle_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::InvalidInput("vehicle_id required".into()))
    }
}

#[derive(Debug, Deserialize)]
pub struct TripsQuery {
    pub vehicle_id: Option<String>,
    /// Lower bound on `start_time`; the last 24 hours when absent.
    pub since: Option<DateTime<Utc>>,
}

/// Ingest acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub trip_id: Option<Uuid>,
    /// Best-effort steps that failed.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// `POST /api/vehicle/ingest`
pub async fn ingest(
    State(ctx): State<ApiContext>,
    payload: Result<Json<IngestPayload>, JsonRejection>,
) -> ApiResult<Json<IngestResponse>> {
    let Json(payload) = payload?;
    let report = ctx.service.ingest(&payload).await?;

    Ok(Json(IngestResponse {
        ok: true,
        trip_id: report.trip.map(|trip| trip.id),
        warnings: report.soft_errors.iter().map(ToString::to_string).collect(),
    }))
}

/// `GET /api/vehicle/status?vehicle_id=`
pub async fn status(
    State(ctx): State<ApiContext>,
    query: Result<Query<VehicleQuery>, QueryRejection>,
) -> ApiResult<Json<TelemetryStatus>> {
    let Query(query) = query?;
    let vehicle_id = query.vehicle_id()?;

    let lookup = ctx.service.get_status(&vehicle_id).await?;
    tracing::debug!(vehicle_id = %vehicle_id, source = ?lookup.source, "Status lookup");

    lookup
        .status
        .map(Json)
        .ok_or(ApiError::VehicleNotFound(vehicle_id))
}

/// `GET /api/vehicle/trips?vehicle_id=[&since=]`
pub async fn trips(
    State(ctx): State<ApiContext>,
    query: Result<Query<TripsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Trip>>> {
    let Query(TripsQuery { vehicle_id, since }) = query?;
    let vehicle_id = VehicleQuery { vehicle_id }.vehicle_id()?;

    let lookup = match since {
        Some(since) => ctx.service.get_trips_since(&vehicle_id, since).await?,
        None => ctx.service.get_trips_last_24h(&vehicle_id).await?,
    };

    match lookup {
        TripLookup::Trips(trips) => Ok(Json(trips)),
        TripLookup::NoTrips => Err(ApiError::NoTrips(vehicle_id)),
    }
}

/// `GET /api/vehicles`
pub async fn vehicles(State(ctx): State<ApiContext>) -> ApiResult<Json<VehicleIdList>> {
    let vehicle_ids = ctx.service.list_vehicle_ids().await?;
    Ok(Json(VehicleIdList { vehicle_ids }))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

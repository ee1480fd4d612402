use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use berthcare_domain::health::{ComponentStatus, SystemStatus};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// ISO-8601 time the response was generated
    pub timestamp: String,
    /// Whole seconds since the server started
    pub uptime_seconds: u64,
    /// Package version
    pub version: String,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Readiness response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    pub timestamp: String,
    pub components: HashMap<String, ComponentHealth>,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is running", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check requested");

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now_iso(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check: can the service reach its database
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database answers", body = ReadinessResponse),
        (status = 503, description = "Database unavailable", body = ReadinessResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let system_health = state.health_service.get_system_health().await;

    let components = system_health
        .components
        .into_iter()
        .map(|(name, component)| {
            (
                name,
                ComponentHealth {
                    status: component_status_label(component.status).to_string(),
                    details: component.details,
                },
            )
        })
        .collect();

    let status_code = match system_health.status {
        SystemStatus::Unhealthy => {
            warn!("Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
        SystemStatus::Healthy | SystemStatus::Degraded => StatusCode::OK,
    };

    let response = ReadinessResponse {
        status: system_status_label(system_health.status).to_string(),
        timestamp: now_iso(),
        components,
    };

    (status_code, Json(response))
}

fn system_status_label(status: SystemStatus) -> &'static str {
    match status {
        SystemStatus::Healthy => "healthy",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "unhealthy",
    }
}

fn component_status_label(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}

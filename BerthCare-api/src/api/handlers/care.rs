use axum::{extract::State, Json};
use berthcare_data::models::{Schedule, Visit};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument};
use utoipa::IntoParams;

use crate::api::error::ErrorResponse;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Day selector for a caregiver's schedule
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleDayQuery {
    /// Calendar day, YYYY-MM-DD
    pub date: NaiveDate,
}

/// A caregiver's schedules for one day, earliest first
#[utoipa::path(
    get,
    path = "/api/v1/caregivers/{id}/schedules",
    params(
        ("id" = String, Path, description = "Caregiver ID"),
        ScheduleDayQuery
    ),
    responses(
        (status = 200, description = "Schedules for the day"),
        (status = 400, description = "Missing or malformed date", body = ErrorResponse)
    ),
    tag = "schedules"
)]
#[instrument(skip(state))]
pub async fn caregiver_schedules(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<ScheduleDayQuery>,
) -> Result<Json<Vec<Schedule>>, ErrorResponse> {
    let schedules = state
        .repositories
        .schedules
        .find_by_date_and_caregiver(&id, query.date)
        .await?;
    debug!("Caregiver has {} schedules on {}", schedules.len(), query.date);
    Ok(Json(schedules))
}

/// The most recent visit recorded for a client
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/visits/latest",
    params(
        ("id" = String, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Latest visit"),
        (status = 404, description = "Client has no visits", body = ErrorResponse)
    ),
    tag = "visits"
)]
#[instrument(skip(state))]
pub async fn latest_client_visit(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Visit>, ErrorResponse> {
    state
        .repositories
        .visits
        .find_last_by_client(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("visit"))
}

/// Deep-merge a JSON object into a visit's documentation
#[utoipa::path(
    patch,
    path = "/api/v1/visits/{id}/documentation",
    params(
        ("id" = String, Path, description = "Visit ID")
    ),
    responses(
        (status = 200, description = "Updated visit"),
        (status = 400, description = "Patch is not a JSON object", body = ErrorResponse),
        (status = 404, description = "Visit not found", body = ErrorResponse)
    ),
    tag = "visits"
)]
#[instrument(skip(state, patch))]
pub async fn update_visit_documentation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<JsonValue>,
) -> Result<Json<Visit>, ErrorResponse> {
    let visit = state.repositories.visits.update_documentation(&id, patch).await?;
    info!("Documentation updated for visit {}", visit.id);
    Ok(Json(visit))
}

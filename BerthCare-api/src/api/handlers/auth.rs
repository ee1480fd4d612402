use axum::{extract::State, Json};
use berthcare_domain::auth::RefreshRequest;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::ErrorResponse;
use crate::api::extract::ApiJson;
use crate::state::AppState;

/// Refresh token exchange
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
    #[validate(length(min = 1))]
    pub device_id: String,
    /// Also issue a replacement refresh token
    #[serde(default)]
    pub rotate: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub access_token_expires_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<String>,
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Exchange a device's refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshTokenResponse),
        (status = 400, description = "Missing token or device", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Revoked token or different device", body = ErrorResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, ErrorResponse> {
    payload.validate()?;

    let outcome = state
        .refresh_service
        .refresh(RefreshRequest {
            token: payload.refresh_token,
            device_id: Some(payload.device_id),
            rotate: payload.rotate,
        })
        .await?;
    info!(rotated = outcome.refresh_token.is_some(), "Access token refreshed");

    Ok(Json(RefreshTokenResponse {
        access_token: outcome.access_token.token,
        access_token_expires_at: iso(outcome.access_token.expires_at),
        refresh_token_expires_at: outcome.refresh_token.as_ref().map(|t| iso(t.expires_at)),
        refresh_token: outcome.refresh_token.map(|t| t.token),
    }))
}

use axum::extract::State;
use tracing::{error, instrument};

use crate::api::error::ErrorResponse;
use crate::state::AppState;

/// Deliberately fail so error reporting can be checked end to end.
/// Hidden in production.
#[instrument(skip(state))]
pub async fn test_error(State(state): State<AppState>) -> ErrorResponse {
    if state.config.environment.is_production() {
        return ErrorResponse::not_found("route");
    }

    error!(
        service = %state.config.service_name,
        "Observability test error triggered"
    );
    ErrorResponse::internal_error()
}

/// Fallback for unknown routes
pub async fn route_not_found() -> ErrorResponse {
    ErrorResponse::not_found("route")
}

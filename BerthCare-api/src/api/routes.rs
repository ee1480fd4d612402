use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    routing::{get, patch, post},
    Router,
};
use berthcare_data::models::{Alert, AuditLog, Caregiver, Client, Consent, Photo, Schedule, Visit};
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info_span};
use validator::Validate;

use crate::api::handlers::{auth, care, health, observability, records, Resource};
use crate::openapi::configure_swagger_routes;
use crate::request_id::TraceparentRequestId;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");
    let enable_request_logs = state.config.enable_request_logs;

    let api_routes = Router::new()
        .route("/auth/refresh", post(auth::refresh_token))
        // Specific routes before the generic collections
        .route("/caregivers/:id/schedules", get(care::caregiver_schedules))
        .route("/clients/:id/visits/latest", get(care::latest_client_visit))
        .route("/visits/:id/documentation", patch(care::update_visit_documentation))
        .merge(collection::<Caregiver>())
        .merge(collection::<Client>())
        .merge(collection::<Schedule>())
        .merge(collection::<Visit>())
        .merge(collection::<Photo>())
        .merge(collection::<Alert>())
        .merge(collection::<Consent>())
        .merge(collection::<AuditLog>());

    debug!("API routes configured");

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/observability/test-error", get(observability::test_error))
        .nest("/api/v1", api_routes)
        .fallback(observability::route_not_found)
        .with_state(state)
        .merge(configure_swagger_routes());

    let app = if enable_request_logs {
        app.layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let route = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str)
                .unwrap_or_else(|| request.uri().path());
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();

            info_span!(
                "http.request",
                method = %request.method(),
                route,
                request_id,
            )
        }))
    } else {
        app
    };

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(TraceparentRequestId))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive()),
    )
}

/// List, create, read, update and remove routes for one entity
fn collection<E>() -> Router<AppState>
where
    E: Resource,
    E::Create: DeserializeOwned + Validate,
    E::Update: DeserializeOwned + Validate,
    E::Filter: DeserializeOwned,
{
    Router::new()
        .route(
            &format!("/{}", E::PATH),
            get(records::list::<E>).post(records::create::<E>),
        )
        .route(
            &format!("/{}/:id", E::PATH),
            get(records::get::<E>)
                .patch(records::update::<E>)
                .delete(records::remove::<E>),
        )
}

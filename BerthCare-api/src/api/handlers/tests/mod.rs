mod health_test;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use berthcare_data::Database;
use berthcare_domain::config::AppConfig;
use serde_json::Value;
use tower::ServiceExt;

use crate::api::create_app;
use crate::state::AppState;

/// State over a fresh, migrated in-memory database
pub(super) async fn test_state() -> AppState {
    let db = Database::open_in_memory().unwrap();
    db.migrate().await.unwrap();
    let mut config = AppConfig::from_lookup(|_| None);
    config.auth.jwt_secret = Some("handler-test-secret".to_string());
    AppState::new(&db, config)
}

pub(super) async fn test_app() -> Router {
    create_app(test_state().await)
}

pub(super) async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub(super) async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send and decode, asserting the status first
pub(super) async fn expect_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    status: StatusCode,
) -> Value {
    let response = send(app, method, uri, body).await;
    assert_eq!(response.status(), status, "{method} {uri}");
    json_body(response).await
}

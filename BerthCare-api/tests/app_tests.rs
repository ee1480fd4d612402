use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use berthcare_api::{create_app, AppState};
use berthcare_data::{Database, DatabaseConfig};
use berthcare_domain::config::{AppConfig, AppEnvironment};
use serde_json::Value;
use tower::ServiceExt;

// Initialize tracing once for all tests
static INIT: std::sync::Once = std::sync::Once::new();
fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init();
    });
}

async fn app_with(config: AppConfig) -> Router {
    initialize();
    let db = Database::open_in_memory().unwrap();
    db.migrate().await.unwrap();
    create_app(AppState::new(&db, config))
}

async fn default_app() -> Router {
    app_with(AppConfig::from_lookup(|_| None)).await
}

async fn get(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

// Helper function to get body JSON from a response
async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_app_creation_and_health_check() {
    let app = default_app().await;

    let response = get(&app, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["version"].is_string());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = default_app().await;

    let response = get(
        &app,
        Request::get("/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_request_id_falls_back_to_trace_id() {
    let app = default_app().await;

    let response = get(
        &app,
        Request::get("/health")
            .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(
        response.headers()["x-request-id"],
        "4bf92f3577b34da6a3ce929d0e0e4736"
    );
}

#[tokio::test]
async fn test_request_id_is_generated_when_absent() {
    let app = default_app().await;

    let response = get(&app, Request::get("/health").body(Body::empty()).unwrap()).await;

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = default_app().await;

    let response = get(
        &app,
        Request::get("/health")
            .header(header::ORIGIN, "https://app.berthcare.example")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = default_app().await;

    let response = get(
        &app,
        Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/health"].is_object());
}

#[tokio::test]
async fn test_observability_error_outside_production() {
    let app = default_app().await;

    let response = get(
        &app,
        Request::get("/observability/test-error").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn test_observability_error_hidden_in_production() {
    let mut config = AppConfig::from_lookup(|_| None);
    config.environment = AppEnvironment::Production;
    config.enable_request_logs = false;
    let app = app_with(config).await;

    let response = get(
        &app,
        Request::get("/observability/test-error").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_backed_database_survives_reconnect() {
    initialize();
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        sqlite_path: Some(dir.path().join("nested").join("berthcare.db")),
        ..DatabaseConfig::default()
    };

    let first = Database::connect(&config).unwrap();
    first.migrate().await.unwrap();
    let app = create_app(AppState::new(&first, AppConfig::from_lookup(|_| None)));
    let response = get(
        &app,
        Request::post("/api/v1/clients")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"name":"Ada","address":"1 Quay","organizationId":"org-1"}"#,
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    first.close();
    drop(app);

    let second = Database::connect(&config).unwrap();
    second.migrate().await.unwrap();
    let app = create_app(AppState::new(&second, AppConfig::from_lookup(|_| None)));
    let response = get(&app, Request::get("/api/v1/clients").body(Body::empty()).unwrap()).await;

    let clients = body_json(response).await;
    assert_eq!(clients.as_array().unwrap().len(), 1);
    assert_eq!(clients[0]["name"], "Ada");
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use berthcare_domain::health::{
    ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus, DATABASE_UNAVAILABLE,
};
use chrono::DateTime;

use super::{expect_json, test_app, test_state};
use crate::api::create_app;

// Fixed-answer health service for readiness responses
#[derive(Debug)]
struct StubHealthService {
    status: SystemStatus,
    database: ComponentStatus,
}

#[async_trait]
impl HealthServiceTrait for StubHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database,
                details: Some("stubbed".to_string()),
            },
        );
        SystemHealth {
            status: self.status,
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database {
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
            _ => Ok(true),
        }
    }
}

#[tokio::test]
async fn test_health_check_reports_healthy() {
    let app = test_app().await;

    let body = expect_json(&app, "GET", "/health", None, StatusCode::OK).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptimeSeconds"].is_u64());
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_readiness_with_live_database() {
    let app = test_app().await;

    let body = expect_json(&app, "GET", "/health/ready", None, StatusCode::OK).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_fails_when_database_is_unhealthy() {
    let state = test_state().await.with_health_service(Arc::new(StubHealthService {
        status: SystemStatus::Unhealthy,
        database: ComponentStatus::Unhealthy,
    }));
    let app = create_app(state);

    let body = expect_json(&app, "GET", "/health/ready", None, StatusCode::SERVICE_UNAVAILABLE).await;

    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["components"]["database"]["details"], "stubbed");
}

#[tokio::test]
async fn test_degraded_database_is_still_ready() {
    let state = test_state().await.with_health_service(Arc::new(StubHealthService {
        status: SystemStatus::Degraded,
        database: ComponentStatus::Degraded,
    }));
    let app = create_app(state);

    let body = expect_json(&app, "GET", "/health/ready", None, StatusCode::OK).await;
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_health_stays_up_when_database_is_closed() {
    let db = berthcare_data::Database::open_in_memory().unwrap();
    db.migrate().await.unwrap();
    let app = create_app(crate::state::AppState::new(
        &db,
        berthcare_domain::config::AppConfig::from_lookup(|_| None),
    ));
    db.close();

    expect_json(&app, "GET", "/health", None, StatusCode::OK).await;
    let ready = expect_json(&app, "GET", "/health/ready", None, StatusCode::SERVICE_UNAVAILABLE).await;
    assert_eq!(ready["components"]["database"]["status"], "unhealthy");
    assert_eq!(ready["components"]["database"]["details"], DATABASE_UNAVAILABLE);
}

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,
        crate::api::handlers::health::readiness_check,

        // Care record endpoints
        crate::api::handlers::care::caregiver_schedules,
        crate::api::handlers::care::latest_client_visit,
        crate::api::handlers::care::update_visit_documentation,

        // Device sessions
        crate::api::handlers::auth::refresh_token
    ),
    components(
        schemas(
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ReadinessResponse,
            crate::api::handlers::health::ComponentHealth,
            crate::api::handlers::auth::RefreshTokenRequest,
            crate::api::handlers::auth::RefreshTokenResponse,
            crate::api::error::ErrorResponse
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness checks"),
        (name = "schedules", description = "Caregiver schedules"),
        (name = "visits", description = "Visit documentation"),
        (name = "auth", description = "Device session tokens")
    ),
    info(
        title = "BerthCare API",
        version = "0.1.0",
        description = "Care records for home-care caregivers and coordinators",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "BerthCare API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "health"));
        assert!(tags.iter().any(|tag| tag.name == "visits"));

        for path in [
            "/health",
            "/health/ready",
            "/api/v1/caregivers/{id}/schedules",
            "/api/v1/clients/{id}/visits/latest",
            "/api/v1/visits/{id}/documentation",
            "/api/v1/auth/refresh",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_document_serializes() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("HealthResponse"));
        assert!(json.contains("ErrorResponse"));
    }
}

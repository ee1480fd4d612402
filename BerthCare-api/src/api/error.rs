use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use berthcare_data::RepositoryError;
use berthcare_domain::auth::AuthError;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Error response format for API
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// The write conflicts with existing data or a relation
    pub fn conflict(message: &str) -> Self {
        Self {
            error: "conflict".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// The presented credential is missing, malformed or expired
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: "unauthorized".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// The credential is valid but may not be used here
    pub fn forbidden(message: &str) -> Self {
        Self {
            error: "forbidden".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<RepositoryError> for ErrorResponse {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, .. } => ErrorResponse::not_found(&resource_label(entity)),
            RepositoryError::Validation(message) => ErrorResponse::validation_error(&message, None),
            RepositoryError::ConstraintViolation(message) => {
                warn!("Write rejected by constraint: {}", message);
                ErrorResponse::conflict("The request conflicts with existing data")
            }
            other => {
                error!("Repository failure: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => ErrorResponse::unauthorized("The token is not valid"),
            AuthError::Expired => ErrorResponse::unauthorized("The token has expired"),
            AuthError::Revoked => ErrorResponse::forbidden("The token has been revoked"),
            AuthError::DeviceMismatch => ErrorResponse::forbidden("The token belongs to another device"),
            AuthError::NotFound => ErrorResponse::not_found("token"),
            AuthError::Repository(err) => err.into(),
            other => {
                error!("Token failure: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<ValidationErrors> for ErrorResponse {
    fn from(errors: ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).ok();
        ErrorResponse::validation_error("Request payload failed validation", details)
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), "Rejected request body");
        ErrorResponse::bad_request(&rejection.body_text())
    }
}

impl From<QueryRejection> for ErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        ErrorResponse::bad_request(&rejection.body_text())
    }
}

impl From<PathRejection> for ErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        ErrorResponse::bad_request(&rejection.body_text())
    }
}

/// "AuditLog" becomes "audit log"
pub fn resource_label(entity: &str) -> String {
    let mut label = String::with_capacity(entity.len() + 2);
    for (i, c) in entity.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            label.push(' ');
        }
        label.extend(c.to_lowercase());
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_status_codes() {
        let cases = [
            (RepositoryError::not_found("Visit", "v-1"), StatusCode::NOT_FOUND),
            (RepositoryError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                RepositoryError::ConstraintViolation("UNIQUE constraint failed".into()),
                StatusCode::CONFLICT,
            ),
            (
                RepositoryError::Database(berthcare_data::DatabaseError::Closed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ErrorResponse::from(err).status(), expected);
        }
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let response = ErrorResponse::from(RepositoryError::Database(
            berthcare_data::DatabaseError::Migration("secret table name".into()),
        ));

        assert_eq!(response.message, "An unexpected error occurred");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_auth_errors_map_to_status_codes() {
        let cases = [
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::Expired, StatusCode::UNAUTHORIZED),
            (AuthError::Revoked, StatusCode::FORBIDDEN),
            (AuthError::DeviceMismatch, StatusCode::FORBIDDEN),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::NotConfigured, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ErrorResponse::from(err).status(), expected);
        }
    }

    #[test]
    fn test_not_found_names_the_entity() {
        let response = ErrorResponse::from(RepositoryError::not_found("AuditLog", "x"));
        assert_eq!(response.message, "The requested audit log could not be found");
    }
}

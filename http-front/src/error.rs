//! Error responses in the `{"detail": ...}` / `{"field": [...]}` shape.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bifrost_base::error::{BifrostError, ValidationErrors};

pub const NOT_FOUND_DETAIL: &str = "Not found.";

/// Application error type for axum handlers.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn not_found() -> Self {
        AppError(BifrostError::NotFound(NOT_FOUND_DETAIL.to_string()).into())
    }

    fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        let detail = |status: StatusCode, message: String| {
            (status, serde_json::json!({ "detail": message }))
        };
        match self.0.downcast_ref::<BifrostError>() {
            Some(BifrostError::ValidationError(errors)) => (
                StatusCode::BAD_REQUEST,
                serde_json::to_value(errors).unwrap_or_default(),
            ),
            Some(BifrostError::InvalidParameter(m)) => detail(StatusCode::BAD_REQUEST, m.clone()),
            Some(BifrostError::SerdeJsonError(e)) => {
                detail(StatusCode::BAD_REQUEST, format!("JSON parse error - {}", e))
            }
            Some(BifrostError::Unauthorized(m)) => detail(StatusCode::UNAUTHORIZED, m.clone()),
            Some(BifrostError::PermissionDenied(m)) => detail(StatusCode::FORBIDDEN, m.clone()),
            Some(BifrostError::NotFound(m)) => detail(StatusCode::NOT_FOUND, m.clone()),
            Some(BifrostError::AlreadyExists(m)) => detail(StatusCode::CONFLICT, m.clone()),
            Some(e) => {
                tracing::error!("internal error: {:?}", e);
                detail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server error occurred.".to_string(),
                )
            }
            None => {
                tracing::error!("internal error: {:?}", self.0);
                detail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server error occurred.".to_string(),
                )
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err)
    }
}

impl From<BifrostError> for AppError {
    fn from(err: BifrostError) -> Self {
        AppError(err.into())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError(BifrostError::ValidationError(errors).into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(BifrostError::InvalidParameter(rejection.body_text()).into())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(BifrostError::InvalidParameter(rejection.body_text()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: BifrostError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(BifrostError::InvalidParameter("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BifrostError::validation_field("name", "blank")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BifrostError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(BifrostError::PermissionDenied("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(BifrostError::NotFound("x".to_string())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(BifrostError::AlreadyExists("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(BifrostError::RuntimeError("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError(anyhow::anyhow!("untyped")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bodies() {
        let (_, body) =
            AppError::from(BifrostError::validation_non_field("mismatch")).status_and_body();
        assert_eq!(body, serde_json::json!({"non_field_errors": ["mismatch"]}));
        let (_, body) = AppError::not_found().status_and_body();
        assert_eq!(body, serde_json::json!({"detail": "Not found."}));
    }

    #[test]
    fn test_context_keeps_status() {
        let err: anyhow::Error = BifrostError::PermissionDenied("no".to_string()).into();
        let err = err.context("while updating");
        // downcast_ref looks through context layers
        assert_eq!(
            AppError(err).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}

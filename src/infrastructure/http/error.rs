//! HTTP Error Handling
//!
//! 把 `DispatchError` 转换为统一错误信封 `{error, message?, details?}`

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{AuthFailure, DispatchError, FieldError};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            details: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = details;
        self
    }
}

fn auth_envelope(failure: AuthFailure) -> ErrorResponse {
    match failure {
        AuthFailure::Expired => {
            ErrorResponse::new("Token has expired").with_message("Please log in again")
        }
        AuthFailure::Invalid => {
            ErrorResponse::new("Invalid token").with_message("Please provide a valid token")
        }
        AuthFailure::Missing => {
            ErrorResponse::new("Authorization required").with_message("Please provide a valid token")
        }
    }
}

/// API 错误
///
/// `expose_internal` 为 true（调试模式）时，500 响应包含错误详情
#[derive(Debug)]
pub struct ApiError {
    error: DispatchError,
    expose_internal: bool,
}

impl ApiError {
    pub fn new(error: DispatchError, expose_internal: bool) -> Self {
        Self {
            error,
            expose_internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::Authentication(_) => StatusCode::UNAUTHORIZED,
            DispatchError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            DispatchError::Dependency(_) => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        Self::new(error, false)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.error, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.error, "Request rejected");
        }

        let mut allow = None;
        let body = match self.error {
            DispatchError::Validation(fields) => ErrorResponse::new("Validation failed")
                .with_message(crate::application::error::summarize_fields(&fields))
                .with_details(fields),
            DispatchError::NotFound { path } => {
                ErrorResponse::new("Not found").with_message(format!("No route matches {}", path))
            }
            DispatchError::MethodNotAllowed {
                method,
                path,
                allowed,
            } => {
                allow = Some(
                    allowed
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                ErrorResponse::new("Method not allowed")
                    .with_message(format!("{} is not allowed for {}", method, path))
            }
            DispatchError::Authentication(failure) => auth_envelope(failure),
            DispatchError::PayloadTooLarge { limit } => ErrorResponse::new("Payload too large")
                .with_message(format!("Request body exceeds the maximum of {} bytes", limit)),
            DispatchError::Dependency(msg) => {
                ErrorResponse::new("Service unavailable").with_message(msg)
            }
            DispatchError::Internal(msg) => {
                let body = ErrorResponse::new("Internal server error");
                if self.expose_internal {
                    body.with_message(msg)
                } else {
                    body
                }
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = allow.and_then(|v| HeaderValue::from_str(&v).ok()) {
            response.headers_mut().insert(header::ALLOW, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use http::Method;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_envelope_lists_fields() {
        let err = DispatchError::validation("crop_type", "field required");
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "crop_type");
        assert_eq!(body["details"][0]["message"], "field required");
    }

    #[tokio::test]
    async fn test_method_not_allowed_sets_allow_header() {
        let err = DispatchError::MethodNotAllowed {
            method: Method::DELETE,
            path: "/weather/delhi".to_string(),
            allowed: vec![Method::GET, Method::HEAD],
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_auth_envelopes() {
        let response = ApiError::from(DispatchError::Authentication(AuthFailure::Expired)).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Token has expired");
        assert_eq!(body["message"], "Please log in again");
        assert!(body.get("details").is_none());

        let response = ApiError::from(DispatchError::Authentication(AuthFailure::Missing)).into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Please provide a valid token");
    }

    #[tokio::test]
    async fn test_internal_details_hidden_unless_debug() {
        let hidden = ApiError::new(DispatchError::internal("db exploded"), false).into_response();
        assert_eq!(hidden.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(hidden).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("message").is_none());

        let shown = ApiError::new(DispatchError::internal("db exploded"), true).into_response();
        let body = body_json(shown).await;
        assert_eq!(body["message"], "db exploded");
    }

    #[tokio::test]
    async fn test_dependency_maps_to_503() {
        let response = ApiError::from(DispatchError::Dependency("pool timed out".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

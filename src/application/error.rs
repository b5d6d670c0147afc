//! 应用层错误定义
//!
//! - `DispatchError`: 路由分发的统一错误分类，在 HTTP 边界转换为错误信封
//! - `HandlerError`: 叶子处理器返回的错误
//! - `RegistryError`: 启动阶段的路由注册错误

use http::Method;
use serde::Serialize;
use thiserror::Error;

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// 把字段错误列表拼成一行
pub fn summarize_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 认证失败的具体原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Token 已过期
    Expired,
    /// Token 签名或格式无效
    Invalid,
    /// 请求未携带 Token
    Missing,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthFailure::Expired => "expired",
            AuthFailure::Invalid => "invalid",
            AuthFailure::Missing => "missing",
        };
        f.write_str(s)
    }
}

/// 路由分发错误
///
/// 与 HTTP 状态码一一对应：400 / 404 / 405 / 401 / 413 / 503 / 500
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Validation failed: {}", summarize_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("No route matches path {path}")]
    NotFound { path: String },

    #[error("Method {method} is not allowed for {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },

    #[error("Authentication failed: token {0}")]
    Authentication(AuthFailure),

    #[error("Request body exceeds the maximum of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Dependency unavailable: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// 处理器错误
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Validation failed: {}", summarize_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<HandlerError> for DispatchError {
    fn from(e: HandlerError) -> Self {
        match e {
            HandlerError::Validation(fields) => DispatchError::Validation(fields),
            HandlerError::Dependency(msg) => DispatchError::Dependency(msg),
            HandlerError::Internal(msg) => DispatchError::Internal(msg),
        }
    }
}

impl From<sqlx::Error> for HandlerError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                HandlerError::Dependency(e.to_string())
            }
            _ => HandlerError::Internal(e.to_string()),
        }
    }
}

impl From<crate::domain::DomainError> for HandlerError {
    fn from(e: crate::domain::DomainError) -> Self {
        HandlerError::Internal(e.to_string())
    }
}

/// 路由注册错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Route already registered: {method} {template}")]
    DuplicateRoute { method: Method, template: String },

    #[error("Invalid path template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = DispatchError::Validation(vec![
            FieldError::new("crop_type", "field required"),
            FieldError::new("image", "expected a base64-encoded string"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: crop_type: field required; image: expected a base64-encoded string"
        );
    }

    #[test]
    fn test_handler_error_conversion() {
        let err: DispatchError = HandlerError::dependency("weather api down").into();
        assert!(matches!(err, DispatchError::Dependency(msg) if msg == "weather api down"));
    }
}

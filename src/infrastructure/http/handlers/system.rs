//! System Handlers
//!
//! - `GET /`       存活横幅
//! - `GET /health` 依赖健康检查，健康时 200，否则 503

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;

use crate::application::registry::{FieldKind, Reply, RequestContext, RouteHandler, Schema};
use crate::application::{HandlerError, HealthChecker};
use crate::infrastructure::persistence::DatabaseProbe;

/// 存活横幅响应
#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: String,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub database: &'static str,
    pub version: String,
}

pub fn banner_schema() -> Schema {
    Schema::object()
        .field("status", FieldKind::String)
        .field("message", FieldKind::String)
        .field("version", FieldKind::String)
}

pub fn health_schema() -> Schema {
    Schema::object()
        .field("status", FieldKind::Enum(&["healthy", "degraded", "unhealthy"]))
        .field("message", FieldKind::String)
        .field("database", FieldKind::Enum(&["healthy", "unhealthy"]))
        .field("version", FieldKind::String)
}

/// `GET /` - 只读，不修改任何进程状态
pub struct BannerHandler {
    version: String,
}

impl BannerHandler {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

#[async_trait]
impl RouteHandler for BannerHandler {
    async fn handle(&self, _ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        Reply::json(&BannerResponse {
            status: "healthy",
            message: "AgriSmart AI API is running",
            version: self.version.clone(),
        })
    }
}

/// `GET /health`
pub struct HealthHandler {
    checker: Arc<HealthChecker>,
}

impl HealthHandler {
    pub fn new(checker: Arc<HealthChecker>) -> Self {
        Self { checker }
    }
}

#[async_trait]
impl RouteHandler for HealthHandler {
    async fn handle(&self, _ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        let health = self.checker.check().await;

        // 未配置数据库时视为健康
        let database = match health.probe(DatabaseProbe::NAME) {
            Some(probe) if !probe.healthy => "unhealthy",
            _ => "healthy",
        };

        let status = if health.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        let body = Reply::json(&HealthResponse {
            status: health.status.as_str(),
            message: health.message,
            database,
            version: health.version,
        })?
        .body;

        Ok(Reply::with_status(status, body))
    }
}

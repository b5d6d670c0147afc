//! Health Probe Port - 依赖健康探针
//!
//! 每个外部依赖（数据库等）提供一个探针，由 HealthChecker 聚合

use async_trait::async_trait;
use thiserror::Error;

/// 探针失败
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Dependency unreachable: {0}")]
    Unreachable(String),

    #[error("Dependency check failed: {0}")]
    CheckFailed(String),
}

/// Health Probe Port
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// 探针名称，出现在健康检查结果中（如 "database"）
    fn name(&self) -> &str;

    /// 执行一次存活检查
    async fn check(&self) -> Result<(), ProbeError>;
}

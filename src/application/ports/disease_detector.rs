//! Disease Detector Port - 病害识别模型
//!
//! 实际的图像分类模型不在本服务内，通过该端口委托

use async_trait::async_trait;

use super::provider::ProviderError;
use crate::domain::{Diagnosis, DiagnosisRequest};

#[async_trait]
pub trait DiseaseDetectorPort: Send + Sync {
    /// 对作物图片做病害诊断
    async fn detect(&self, request: DiagnosisRequest) -> Result<Diagnosis, ProviderError>;
}

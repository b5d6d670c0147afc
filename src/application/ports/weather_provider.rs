//! Weather Provider Port - 天气数据来源

use async_trait::async_trait;

use super::provider::ProviderError;
use crate::domain::WeatherReport;

#[async_trait]
pub trait WeatherProviderPort: Send + Sync {
    /// 获取指定地点的天气预报
    async fn forecast(&self, location: &str) -> Result<WeatherReport, ProviderError>;
}

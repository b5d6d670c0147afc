//! Market Data Port - 农产品行情来源

use async_trait::async_trait;

use super::provider::ProviderError;
use crate::domain::{MarketQuery, MarketQuote};

#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// 查询作物在指定市场的当前价格
    async fn quote(&self, query: MarketQuery) -> Result<MarketQuote, ProviderError>;
}

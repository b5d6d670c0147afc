//! Stub Market Data

use async_trait::async_trait;

use crate::application::ports::{MarketDataPort, ProviderError};
use crate::domain::{MarketQuery, MarketQuote, PriceTrend};

#[derive(Debug, Default, Clone)]
pub struct StubMarketData;

impl StubMarketData {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MarketDataPort for StubMarketData {
    async fn quote(&self, query: MarketQuery) -> Result<MarketQuote, ProviderError> {
        // 价格单位：卢比/公担
        MarketQuote::new(query, 2500.0, "per quintal", PriceTrend::Stable)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

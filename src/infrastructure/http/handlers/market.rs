//! Market Prices Handler
//!
//! `GET /market-prices?crop=&location=`

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::registry::{FieldKind, Reply, RequestContext, RouteHandler, Schema};
use crate::application::{HandlerError, MarketDataPort};
use crate::domain::market::{DEFAULT_CROP, DEFAULT_LOCATION};
use crate::domain::{MarketQuery, PriceTrend};

pub fn market_query() -> Schema {
    Schema::object()
        .with_default("crop", FieldKind::String, DEFAULT_CROP)
        .with_default("location", FieldKind::String, DEFAULT_LOCATION)
}

pub fn market_output() -> Schema {
    Schema::object()
        .field("crop", FieldKind::String)
        .field("location", FieldKind::String)
        .field(
            "price",
            FieldKind::Number {
                min: Some(0.0),
                max: None,
            },
        )
        .field("unit", FieldKind::String)
        .field("trend", FieldKind::Enum(PriceTrend::VARIANTS))
}

pub struct MarketPricesHandler {
    market: Arc<dyn MarketDataPort>,
}

impl MarketPricesHandler {
    pub fn new(market: Arc<dyn MarketDataPort>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl RouteHandler for MarketPricesHandler {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        let query: MarketQuery = ctx.input()?;
        let quote = self.market.quote(query).await?;
        Reply::json(&quote)
    }
}

//! Market Context - 农产品价格值对象

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// 默认查询作物
pub const DEFAULT_CROP: &str = "rice";
/// 默认查询市场
pub const DEFAULT_LOCATION: &str = "delhi";

/// 价格走势
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Rising,
    Falling,
    Stable,
}

impl PriceTrend {
    pub const VARIANTS: &'static [&'static str] = &["rising", "falling", "stable"];
}

/// 价格查询条件
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketQuery {
    pub crop: String,
    pub location: String,
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            crop: DEFAULT_CROP.to_string(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

/// 市场报价
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketQuote {
    pub crop: String,
    pub location: String,
    #[serde(serialize_with = "super::number::compact")]
    pub price: f64,
    pub unit: String,
    pub trend: PriceTrend,
}

impl MarketQuote {
    pub fn new(
        query: MarketQuery,
        price: f64,
        unit: impl Into<String>,
        trend: PriceTrend,
    ) -> Result<Self, DomainError> {
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::OutOfRange(format!("price {}", price)));
        }
        Ok(Self {
            crop: query.crop,
            location: query.location,
            price,
            unit: unit.into(),
            trend,
        })
    }
}

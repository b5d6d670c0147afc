//! Domain Layer - 领域层
//!
//! 农业助手各项能力的值对象:
//! - Disease: 作物病害诊断
//! - Weather: 天气预报
//! - Market: 农产品市场价格
//! - Health: 服务健康状态

pub mod disease;
pub mod errors;
pub mod health;
pub mod market;
pub mod weather;

mod number;

pub use disease::{Diagnosis, DiagnosisRequest, Severity};
pub use errors::DomainError;
pub use health::{HealthState, HealthStatus, ProbeReport};
pub use market::{MarketQuery, MarketQuote, PriceTrend};
pub use weather::WeatherReport;

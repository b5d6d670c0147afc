//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod disease_detector;
mod health_probe;
mod market_data;
mod provider;
mod token_verifier;
mod weather_provider;

pub use disease_detector::DiseaseDetectorPort;
pub use health_probe::{HealthProbe, ProbeError};
pub use market_data::MarketDataPort;
pub use provider::ProviderError;
pub use token_verifier::{Claims, TokenVerifierPort};
pub use weather_provider::WeatherProviderPort;

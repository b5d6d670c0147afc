//! Stub Adapters - 固定返回值的能力实现
//!
//! 模型推理与第三方数据源尚未接入，这些适配器返回固定结果

mod disease_detector;
mod market_data;
mod weather_provider;

pub use disease_detector::StubDiseaseDetector;
pub use market_data::StubMarketData;
pub use weather_provider::StubWeatherProvider;

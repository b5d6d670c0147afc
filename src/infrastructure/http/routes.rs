//! HTTP Routes
//!
//! 启动时显式注册全部路由:
//! - GET  /                         存活横幅
//! - GET  /health                   依赖健康检查
//! - POST /detect-disease           病害识别
//! - GET  /weather/{location}       天气
//! - GET  /market-prices            市场价格
//! - 以上三项同时挂载在 /api/v1 下
//! - GET  {api_prefix}/{group}      路由组索引（auth 组另有 GET /me，需认证）

use std::sync::Arc;

use axum::Router;

use super::dispatch::dispatch_request;
use super::handlers::{
    banner_schema, detect_disease_input, diagnosis_output, health_schema, market_output,
    market_query, route_groups, weather_output, BannerHandler, DetectDiseaseHandler,
    HealthHandler, MarketPricesHandler, WeatherHandler,
};
use super::state::AppState;
use crate::application::registry::{join_paths, RouteHandler, RouteSpec};
use crate::application::{
    DiseaseDetectorPort, HealthChecker, MarketDataPort, RegistryBuilder, RegistryError,
    WeatherProviderPort,
};
use crate::infrastructure::adapters::{StubDiseaseDetector, StubMarketData, StubWeatherProvider};

/// 版本化挂载前缀
pub const VERSIONED_PREFIX: &str = "/api/v1";

/// 路由处理器依赖的能力实现
#[derive(Clone)]
pub struct Capabilities {
    pub health: Arc<HealthChecker>,
    pub detector: Arc<dyn DiseaseDetectorPort>,
    pub weather: Arc<dyn WeatherProviderPort>,
    pub market: Arc<dyn MarketDataPort>,
}

impl Capabilities {
    /// 使用固定返回值的能力实现
    pub fn stubbed(health: Arc<HealthChecker>) -> Self {
        Self {
            health,
            detector: Arc::new(StubDiseaseDetector::new()),
            weather: Arc::new(StubWeatherProvider::new()),
            market: Arc::new(StubMarketData::new()),
        }
    }
}

/// 注册全部路由
pub fn register_all(
    builder: &mut RegistryBuilder,
    caps: &Capabilities,
    api_prefix: &str,
) -> Result<(), RegistryError> {
    let version = caps.health.version().to_string();

    builder.add(RouteSpec::get("/", BannerHandler::new(version)).output(banner_schema()))?;
    builder.add(
        RouteSpec::get("/health", HealthHandler::new(caps.health.clone())).output(health_schema()),
    )?;

    let detect: Arc<dyn RouteHandler> = Arc::new(DetectDiseaseHandler::new(caps.detector.clone()));
    let weather: Arc<dyn RouteHandler> = Arc::new(WeatherHandler::new(caps.weather.clone()));
    let market: Arc<dyn RouteHandler> = Arc::new(MarketPricesHandler::new(caps.market.clone()));

    for prefix in ["/", VERSIONED_PREFIX] {
        builder.add(
            RouteSpec::shared(http::Method::POST, join_paths(prefix, "detect-disease"), detect.clone())
                .body(detect_disease_input())
                .output(diagnosis_output()),
        )?;
        builder.add(
            RouteSpec::shared(http::Method::GET, join_paths(prefix, "weather/{location}"), weather.clone())
                .output(weather_output()),
        )?;
        builder.add(
            RouteSpec::shared(http::Method::GET, join_paths(prefix, "market-prices"), market.clone())
                .query(market_query())
                .output(market_output()),
        )?;
    }

    for group in route_groups() {
        builder.mount(api_prefix, group.as_ref())?;
    }

    tracing::info!(routes = builder.len(), "Routes registered");
    Ok(())
}

/// 创建 axum Router，所有请求交给路由表分发
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().fallback(dispatch_request)
}

//! HTTP Handlers - 叶子路由处理器

mod disease;
mod groups;
mod market;
mod system;
mod weather;

pub use disease::{detect_disease_input, diagnosis_output, DetectDiseaseHandler};
pub use groups::{route_groups, AuthGroup, CurrentUserHandler, FeatureGroup, GroupIndexHandler};
pub use market::{market_output, market_query, MarketPricesHandler};
pub use system::{banner_schema, health_schema, BannerHandler, HealthHandler};
pub use weather::{weather_output, WeatherHandler};

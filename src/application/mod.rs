//! 应用层 - 请求路由与能力注册
//!
//! 包含：
//! - registry: 路由表、路径模板匹配、Schema 校验、分发流程
//! - health: 依赖探针聚合
//! - ports: 六边形架构端口定义（探针、Token 校验、病害识别、天气、行情）
//! - error: 分发错误分类

pub mod error;
pub mod health;
pub mod ports;
pub mod registry;

pub use error::{AuthFailure, DispatchError, FieldError, HandlerError, RegistryError};
pub use health::HealthChecker;
pub use ports::{
    Claims, DiseaseDetectorPort, HealthProbe, MarketDataPort, ProbeError, ProviderError,
    TokenVerifierPort, WeatherProviderPort,
};
pub use registry::{
    FieldKind, GroupScope, InputSource, PathTemplate, Registry, RegistryBuilder, Reply,
    RequestContext, RequestEnvelope, RouteGroup, RouteHandler, RouteSpec, Schema,
};

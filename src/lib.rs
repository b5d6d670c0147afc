//! AgriSmart - 农业助手后端
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 病害诊断、天气、市场价格、健康状态的值对象
//!
//! 应用层 (application/):
//! - Registry: 路由注册、路径匹配、Schema 校验、分发
//! - Health: 依赖探针聚合
//! - Ports: 探针、Token 校验、病害识别、天气、行情
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: axum 服务器、路由注册、叶子处理器
//! - Auth: JWT 校验
//! - Persistence: SQLite 连接池与探针
//! - Adapters: 固定返回值的能力实现

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

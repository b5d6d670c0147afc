//! Application State
//!
//! 路由表在启动时构建完成，之后只读共享

use crate::application::Registry;

/// 应用状态
pub struct AppState {
    pub registry: Registry,
    /// 请求体最大字节数
    pub max_body_bytes: usize,
    /// 调试模式下 500 响应包含错误详情
    pub debug: bool,
}

impl AppState {
    pub fn new(registry: Registry, max_body_bytes: usize, debug: bool) -> Self {
        Self {
            registry,
            max_body_bytes,
            debug,
        }
    }
}

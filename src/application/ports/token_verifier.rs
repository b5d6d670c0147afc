//! Token Verifier Port - 请求认证
//!
//! 需要认证的路由在分发前调用该端口校验 Bearer Token

use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::application::error::AuthFailure;

/// Token 中携带的声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 用户标识
    pub sub: String,
    /// 签发时间（UNIX 秒）
    pub iat: i64,
    /// 过期时间（UNIX 秒）
    pub exp: i64,
}

/// Token Verifier Port
pub trait TokenVerifierPort: Send + Sync {
    /// 从请求头中提取并校验 Token
    fn verify(&self, headers: &HeaderMap) -> Result<Claims, AuthFailure>;
}

//! 外部能力提供方的公共错误

use thiserror::Error;

/// 外部提供方错误（模型推理、天气 API、行情 API）
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for crate::application::HandlerError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::InvalidInput(msg) => Self::invalid_field("body", msg),
            ProviderError::InvalidResponse(msg) => Self::Internal(msg),
        }
    }
}

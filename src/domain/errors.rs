//! Domain Errors - 领域校验错误

use thiserror::Error;

/// 值对象构造失败
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Empty value: {0}")]
    Empty(&'static str),
}

//! Authentication - Bearer Token 校验

mod jwt;

pub use jwt::{extract_bearer, JwtVerifier};

//! Persistence Layer - 后备存储
//!
//! 只负责连接池与健康探针，表结构与迁移不在本服务内

pub mod sqlite;

pub use self::sqlite::{create_pool, DatabaseProbe, DbPool};

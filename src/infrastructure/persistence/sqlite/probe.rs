//! Database Probe - 数据库存活检查

use async_trait::async_trait;

use super::DbPool;
use crate::application::ports::{HealthProbe, ProbeError};

/// 对连接池执行 `SELECT 1`
///
/// 连接在检查结束时归还连接池（包括失败路径）
pub struct DatabaseProbe {
    pool: DbPool,
}

impl DatabaseProbe {
    pub const NAME: &'static str = "database";

    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for DatabaseProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn check(&self) -> Result<(), ProbeError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;

        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(|e| ProbeError::CheckFailed(e.to_string()))?;

        Ok(())
    }
}

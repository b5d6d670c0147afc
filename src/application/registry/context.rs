//! Envelopes & Request Context
//!
//! - `RequestEnvelope`: 每次请求创建、只读
//! - `Reply`: 处理器产出的响应信封（状态码 + JSON 体）
//! - `RequestContext`: 传给处理器的上下文，包含解析后的输入、认证声明、请求级事务

use std::collections::BTreeMap;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::path::PathParams;
use crate::application::error::HandlerError;
use crate::application::ports::Claims;

/// 请求信封
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: BTreeMap::new(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }
}

/// 响应信封
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// 序列化任意结构为 200 响应
    pub fn json<T: Serialize>(body: &T) -> Result<Self, HandlerError> {
        serde_json::to_value(body)
            .map(Self::ok)
            .map_err(|e| HandlerError::internal(format!("Failed to serialize response: {}", e)))
    }
}

/// 处理器上下文
pub struct RequestContext {
    request: RequestEnvelope,
    params: PathParams,
    input: Map<String, Value>,
    claims: Option<Claims>,
    pool: Option<SqlitePool>,
    transaction: Option<Transaction<'static, Sqlite>>,
}

impl RequestContext {
    pub(crate) fn new(
        request: RequestEnvelope,
        params: PathParams,
        input: Map<String, Value>,
        claims: Option<Claims>,
        pool: Option<SqlitePool>,
    ) -> Self {
        Self {
            request,
            params,
            input,
            claims,
            pool,
            transaction: None,
        }
    }

    pub fn request(&self) -> &RequestEnvelope {
        &self.request
    }

    pub fn request_id(&self) -> Uuid {
        self.request.id
    }

    /// 路径参数
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// 已校验的输入字段
    pub fn input_str(&self, name: &str) -> Option<&str> {
        self.input.get(name).and_then(Value::as_str)
    }

    pub fn input_value(&self) -> &Map<String, Value> {
        &self.input
    }

    /// 把已校验的输入反序列化为具体类型
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(Value::Object(self.input.clone()))
            .map_err(|e| HandlerError::internal(format!("Validated input did not decode: {}", e)))
    }

    /// 认证声明，仅在需要认证的路由上存在
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// 请求级事务，首次调用时从连接池开启
    ///
    /// 处理成功后由分发流程提交，失败或 panic 时回滚
    pub async fn transaction(&mut self) -> Result<&mut Transaction<'static, Sqlite>, HandlerError> {
        let transaction = match self.transaction.take() {
            Some(tx) => tx,
            None => {
                let pool = self
                    .pool
                    .as_ref()
                    .ok_or_else(|| HandlerError::dependency("No backing store configured"))?;
                pool.begin()
                    .await
                    .map_err(|e| HandlerError::dependency(format!("Failed to open transaction: {}", e)))?
            }
        };
        Ok(self.transaction.insert(transaction))
    }

    pub(crate) fn has_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub(crate) async fn commit(&mut self) -> Result<(), sqlx::Error> {
        match self.transaction.take() {
            Some(tx) => tx.commit().await,
            None => Ok(()),
        }
    }

    pub(crate) async fn rollback(&mut self) -> Result<(), sqlx::Error> {
        match self.transaction.take() {
            Some(tx) => tx.rollback().await,
            None => Ok(()),
        }
    }
}

/// 路由处理器
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError>;
}

//! Request Router & Capability Registry
//!
//! 启动时通过 `RegistryBuilder` 显式注册全部路由，构建完成后路由表只读，
//! 可被任意数量的并发请求无锁共享。
//!
//! 分发流程: received → validated → handled → responded
//! 1. 路径模板匹配（段数 → 静态段 → 参数段），按注册顺序取第一个完全匹配
//! 2. 路径匹配但方法不匹配 → 405；没有任何路径匹配 → 404
//! 3. 需要认证的路由先做 Token 校验
//! 4. 输入按 Schema 校验（逐字段报错），补齐默认值
//! 5. 调用处理器；panic 被捕获为内部错误
//! 6. 输出按 Schema 校验；请求级事务在成功时提交、失败时回滚

mod context;
mod group;
mod path;
mod schema;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use http::{HeaderMap, Method};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::Instrument;

pub use context::{Reply, RequestContext, RequestEnvelope, RouteHandler};
pub use group::{GroupScope, RouteGroup};
pub use path::{join_paths, split_path, PathParams, PathTemplate};
pub use schema::{FieldKind, Schema};

use super::error::{DispatchError, RegistryError};
use super::health::HealthChecker;
use super::ports::{Claims, TokenVerifierPort};
use crate::domain::HealthStatus;

/// 输入来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// JSON 请求体
    Body,
    /// 查询字符串（所有值均为字符串）
    Query,
}

/// 路由声明
///
/// 以普通数据描述一条路由，交给 `RegistryBuilder::add` 注册
pub struct RouteSpec {
    method: Method,
    template: String,
    input: Option<Schema>,
    input_source: InputSource,
    output: Option<Schema>,
    requires_auth: bool,
    group: Option<&'static str>,
    handler: Arc<dyn RouteHandler>,
}

impl RouteSpec {
    pub fn new(
        method: Method,
        template: impl Into<String>,
        handler: impl RouteHandler + 'static,
    ) -> Self {
        Self::shared(method, template, Arc::new(handler))
    }

    /// 使用已共享的处理器（同一处理器挂载到多个路径时）
    pub fn shared(
        method: Method,
        template: impl Into<String>,
        handler: Arc<dyn RouteHandler>,
    ) -> Self {
        Self {
            method,
            template: template.into(),
            input: None,
            input_source: InputSource::Body,
            output: None,
            requires_auth: false,
            group: None,
            handler,
        }
    }

    pub fn get(template: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::new(Method::GET, template, handler)
    }

    pub fn post(template: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::new(Method::POST, template, handler)
    }

    /// 请求体 Schema
    pub fn body(mut self, schema: Schema) -> Self {
        self.input = Some(schema);
        self.input_source = InputSource::Body;
        self
    }

    /// 查询字符串 Schema
    pub fn query(mut self, schema: Schema) -> Self {
        self.input = Some(schema);
        self.input_source = InputSource::Query;
        self
    }

    pub fn output(mut self, schema: Schema) -> Self {
        self.output = Some(schema);
        self
    }

    /// 标记为需要认证
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// 已注册路由（不可变）
struct Route {
    method: Method,
    template: PathTemplate,
    input: Option<Schema>,
    input_source: InputSource,
    output: Option<Schema>,
    requires_auth: bool,
    group: Option<&'static str>,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    /// 解析并校验输入
    fn parse_input(&self, request: &RequestEnvelope) -> Result<Map<String, Value>, DispatchError> {
        let Some(schema) = &self.input else {
            return Ok(Map::new());
        };

        let raw = match self.input_source {
            InputSource::Query => Value::Object(
                request
                    .query
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            InputSource::Body => {
                if request.body.iter().all(u8::is_ascii_whitespace) {
                    Value::Object(Map::new())
                } else {
                    serde_json::from_slice(&request.body).map_err(|e| {
                        DispatchError::validation("body", format!("invalid JSON: {}", e))
                    })?
                }
            }
        };

        schema.validate(&raw).map_err(DispatchError::Validation)
    }

    fn check_output(&self, reply: Reply) -> Result<Reply, DispatchError> {
        if let Some(schema) = &self.output {
            if let Err(errors) = schema.validate(&reply.body) {
                return Err(DispatchError::internal(format!(
                    "Response for {} {} violates its output schema: {}",
                    self.method,
                    self.template,
                    super::error::summarize_fields(&errors)
                )));
            }
        }
        Ok(reply)
    }
}

/// 路由描述（用于启动日志与自检）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub template: String,
    pub requires_auth: bool,
    pub group: Option<&'static str>,
}

/// 路由注册器
pub struct RegistryBuilder {
    routes: Vec<Route>,
    token_verifier: Option<Arc<dyn TokenVerifierPort>>,
    health: Option<Arc<HealthChecker>>,
    pool: Option<SqlitePool>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            token_verifier: None,
            health: None,
            pool: None,
        }
    }

    pub fn with_token_verifier(mut self, verifier: Arc<dyn TokenVerifierPort>) -> Self {
        self.token_verifier = Some(verifier);
        self
    }

    pub fn with_health(mut self, health: Arc<HealthChecker>) -> Self {
        self.health = Some(health);
        self
    }

    /// 共享连接池，处理器通过 `RequestContext::transaction` 按需获取
    pub fn with_pool(mut self, pool: SqlitePool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// 注册一条路由
    ///
    /// 方法 + 路径模板必须唯一，否则返回 `DuplicateRoute`
    pub fn register(
        &mut self,
        method: Method,
        path_template: &str,
        input_schema: Option<Schema>,
        output_schema: Option<Schema>,
        handler: Arc<dyn RouteHandler>,
    ) -> Result<&mut Self, RegistryError> {
        let mut spec = RouteSpec::shared(method, path_template, handler);
        spec.input = input_schema;
        spec.output = output_schema;
        self.add(spec)?;
        Ok(self)
    }

    /// 注册一条路由声明
    pub fn add(&mut self, spec: RouteSpec) -> Result<(), RegistryError> {
        let template = PathTemplate::parse(&spec.template)?;

        let duplicate = self
            .routes
            .iter()
            .any(|r| r.method == spec.method && r.template.same_shape(&template));
        if duplicate {
            return Err(RegistryError::DuplicateRoute {
                method: spec.method,
                template: template.as_str().to_string(),
            });
        }

        tracing::debug!(
            method = %spec.method,
            template = %template,
            requires_auth = spec.requires_auth,
            group = spec.group.unwrap_or("-"),
            "Route registered"
        );

        self.routes.push(Route {
            method: spec.method,
            template,
            input: spec.input,
            input_source: spec.input_source,
            output: spec.output,
            requires_auth: spec.requires_auth,
            group: spec.group,
            handler: spec.handler,
        });
        Ok(())
    }

    /// 在 `{prefix}/{group.name()}` 下挂载一个路由组
    pub fn mount(&mut self, prefix: &str, group: &dyn RouteGroup) -> Result<(), RegistryError> {
        let mut scope = GroupScope::new(self, join_paths(prefix, group.name()), group.name());
        group.register(&mut scope)?;
        tracing::debug!(group = group.name(), prefix, "Route group mounted");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn build(self) -> Registry {
        Registry {
            routes: self.routes,
            token_verifier: self.token_verifier,
            health: self.health,
            pool: self.pool,
        }
    }
}

/// 路由表（构建后只读）
pub struct Registry {
    routes: Vec<Route>,
    token_verifier: Option<Arc<dyn TokenVerifierPort>>,
    health: Option<Arc<HealthChecker>>,
    pool: Option<SqlitePool>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = RouteInfo> + '_ {
        self.routes.iter().map(|r| RouteInfo {
            method: r.method.clone(),
            template: r.template.as_str().to_string(),
            requires_auth: r.requires_auth,
            group: r.group,
        })
    }

    /// 匹配到的路由是否读取请求体
    ///
    /// 没有路由匹配时返回与 `dispatch` 相同的 404 / 405 错误
    pub fn reads_body(&self, method: &Method, path: &str) -> Result<bool, DispatchError> {
        let (route, _) = self.resolve(method, path)?;
        Ok(route.input.is_some() && route.input_source == InputSource::Body)
    }

    /// 执行已注册的依赖探针并聚合为健康状态
    pub async fn health(&self) -> HealthStatus {
        match &self.health {
            Some(checker) => checker.check().await,
            None => HealthChecker::new(env!("CARGO_PKG_VERSION")).check().await,
        }
    }

    /// 分发一个请求
    pub async fn dispatch(&self, request: RequestEnvelope) -> Result<Reply, DispatchError> {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
        );
        self.dispatch_inner(request).instrument(span).await
    }

    async fn dispatch_inner(&self, request: RequestEnvelope) -> Result<Reply, DispatchError> {
        let (route, params) = self.resolve(&request.method, &request.path)?;

        let claims = if route.requires_auth {
            Some(self.authenticate(&request.headers)?)
        } else {
            None
        };

        let input = route.parse_input(&request)?;
        tracing::debug!(template = %route.template, "Route matched");

        let mut ctx = RequestContext::new(request, params, input, claims, self.pool.clone());
        let outcome = AssertUnwindSafe(route.handler.handle(&mut ctx))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(reply)) => route.check_output(reply),
            Ok(Err(e)) => Err(DispatchError::from(e)),
            Err(panic) => Err(DispatchError::internal(format!(
                "Handler panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        self.finish(&mut ctx, result).await
    }

    /// 按注册顺序查找第一个完全匹配的路由
    fn resolve(&self, method: &Method, path: &str) -> Result<(&Route, PathParams), DispatchError> {
        let segments = split_path(path);
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            if let Some(params) = route.template.match_segments(&segments) {
                if &route.method == method {
                    return Ok((route, params));
                }
                if !allowed.contains(&route.method) {
                    allowed.push(route.method.clone());
                }
            }
        }

        if allowed.is_empty() {
            Err(DispatchError::NotFound {
                path: path.to_string(),
            })
        } else {
            Err(DispatchError::MethodNotAllowed {
                method: method.clone(),
                path: path.to_string(),
                allowed,
            })
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, DispatchError> {
        let verifier = self.token_verifier.as_ref().ok_or_else(|| {
            DispatchError::internal("Route requires authentication but no token verifier is configured")
        })?;
        verifier.verify(headers).map_err(|failure| {
            tracing::debug!(reason = %failure, "Authentication rejected");
            DispatchError::Authentication(failure)
        })
    }

    /// 提交或回滚请求级事务
    async fn finish(
        &self,
        ctx: &mut RequestContext,
        result: Result<Reply, DispatchError>,
    ) -> Result<Reply, DispatchError> {
        if !ctx.has_transaction() {
            if let Err(DispatchError::Internal(msg)) = &result {
                tracing::error!(error = %msg, "Request failed with internal error");
            }
            return result;
        }

        match result {
            Ok(reply) => match ctx.commit().await {
                Ok(()) => Ok(reply),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to commit request transaction");
                    Err(DispatchError::Dependency(format!(
                        "Failed to commit transaction: {}",
                        e
                    )))
                }
            },
            Err(err) => {
                match &err {
                    DispatchError::Internal(msg) => {
                        tracing::error!(error = %msg, "Internal error, rolling back request transaction");
                    }
                    other => {
                        tracing::warn!(error = %other, "Request failed, rolling back request transaction");
                    }
                }
                if let Err(e) = ctx.rollback().await {
                    tracing::error!(error = %e, "Failed to roll back request transaction");
                }
                Err(err)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests;

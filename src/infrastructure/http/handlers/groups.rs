//! Route Groups
//!
//! `auth`、`disease`、`irrigation`、`market`、`weather`、`schemes`、`community`
//! 挂载在 `{api_prefix}/{name}` 下，每组提供一个索引路由

use async_trait::async_trait;
use serde_json::json;

use crate::application::registry::{
    FieldKind, GroupScope, Reply, RequestContext, RouteGroup, RouteHandler, RouteSpec, Schema,
};
use crate::application::{HandlerError, RegistryError};

/// 注册顺序固定
pub const FEATURE_GROUPS: &[&str] = &[
    "disease",
    "irrigation",
    "market",
    "weather",
    "schemes",
    "community",
];

pub fn group_index_output() -> Schema {
    Schema::object()
        .field("group", FieldKind::String)
        .field("status", FieldKind::Enum(&["available"]))
}

/// `GET {prefix}/{group}`
pub struct GroupIndexHandler {
    group: &'static str,
}

#[async_trait]
impl RouteHandler for GroupIndexHandler {
    async fn handle(&self, _ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        Ok(Reply::ok(json!({ "group": self.group, "status": "available" })))
    }
}

fn add_index(scope: &mut GroupScope<'_>) -> Result<(), RegistryError> {
    let group = scope.name();
    scope.add(RouteSpec::get("/", GroupIndexHandler { group }).output(group_index_output()))
}

/// 只有索引路由的功能组
pub struct FeatureGroup {
    name: &'static str,
}

impl FeatureGroup {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl RouteGroup for FeatureGroup {
    fn name(&self) -> &'static str {
        self.name
    }

    fn register(&self, scope: &mut GroupScope<'_>) -> Result<(), RegistryError> {
        add_index(scope)
    }
}

/// `auth` 组，额外提供 `GET /me`
pub struct AuthGroup;

impl RouteGroup for AuthGroup {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn register(&self, scope: &mut GroupScope<'_>) -> Result<(), RegistryError> {
        add_index(scope)?;
        scope.add(
            RouteSpec::get("/me", CurrentUserHandler)
                .output(Schema::object().field("user_id", FieldKind::String))
                .authenticated(),
        )
    }
}

/// `GET {prefix}/auth/me` - 返回 Token 中的用户 ID
pub struct CurrentUserHandler;

#[async_trait]
impl RouteHandler for CurrentUserHandler {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        let claims = ctx
            .claims()
            .ok_or_else(|| HandlerError::internal("authenticated route reached without claims"))?;
        Ok(Reply::ok(json!({ "user_id": claims.sub })))
    }
}

/// 全部路由组，`auth` 在前
pub fn route_groups() -> Vec<Box<dyn RouteGroup>> {
    let mut groups: Vec<Box<dyn RouteGroup>> = vec![Box::new(AuthGroup)];
    groups.extend(
        FEATURE_GROUPS
            .iter()
            .map(|name| Box::new(FeatureGroup::new(*name)) as Box<dyn RouteGroup>),
    );
    groups
}

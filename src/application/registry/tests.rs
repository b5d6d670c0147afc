use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use super::*;
use crate::application::error::{AuthFailure, FieldError, HandlerError};

/// 同步函数包装成处理器
struct FnHandler(fn(&RequestContext) -> Result<Reply, HandlerError>);

#[async_trait]
impl RouteHandler for FnHandler {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        (self.0)(ctx)
    }
}

fn echo_param(ctx: &RequestContext) -> Result<Reply, HandlerError> {
    Ok(Reply::ok(json!({ "location": ctx.param("location") })))
}

fn constant(_: &RequestContext) -> Result<Reply, HandlerError> {
    Ok(Reply::ok(json!({ "route": "static" })))
}

fn echo_input(ctx: &RequestContext) -> Result<Reply, HandlerError> {
    Ok(Reply::ok(serde_json::Value::Object(ctx.input_value().clone())))
}

fn panicking(_: &RequestContext) -> Result<Reply, HandlerError> {
    panic!("handler bug");
}

struct StaticVerifier;

impl TokenVerifierPort for StaticVerifier {
    fn verify(&self, headers: &HeaderMap) -> Result<Claims, AuthFailure> {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            None => Err(AuthFailure::Missing),
            Some("Bearer good") => Ok(Claims {
                sub: "farmer-1".to_string(),
                iat: 0,
                exp: i64::MAX,
            }),
            Some("Bearer old") => Err(AuthFailure::Expired),
            Some(_) => Err(AuthFailure::Invalid),
        }
    }
}

struct WhoAmI;

#[async_trait]
impl RouteHandler for WhoAmI {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        let sub = ctx.claims().map(|c| c.sub.clone());
        Ok(Reply::ok(json!({ "user_id": sub })))
    }
}

fn weather_registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .add(
            RouteSpec::get("/weather/{location}", FnHandler(echo_param))
                .output(Schema::object().field("location", FieldKind::String)),
        )
        .unwrap();
    builder.build()
}

#[tokio::test]
async fn test_dispatch_binds_params() {
    let registry = weather_registry();
    let reply = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/weather/delhi"))
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "location": "delhi" }));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let registry = weather_registry();
    let err = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/soil"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NotFound { path } if path == "/soil"));
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let registry = weather_registry();
    let err = registry
        .dispatch(RequestEnvelope::new(Method::DELETE, "/weather/delhi"))
        .await
        .unwrap_err();
    match err {
        DispatchError::MethodNotAllowed { allowed, .. } => assert_eq!(allowed, vec![Method::GET]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut builder = Registry::builder();
    builder
        .register(Method::GET, "/weather/{location}", None, None, Arc::new(FnHandler(echo_param)))
        .unwrap();
    let err = builder
        .register(Method::GET, "/weather/{city}", None, None, Arc::new(FnHandler(echo_param)))
        .map(|_| ())
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateRoute {
            method: Method::GET,
            template: "/weather/{city}".to_string(),
        }
    );
    assert!(builder
        .register(Method::POST, "/weather/{location}", None, None, Arc::new(FnHandler(echo_param)))
        .is_ok());
    assert_eq!(builder.len(), 2);
}

#[tokio::test]
async fn test_registration_order_breaks_ties() {
    let mut builder = Registry::builder();
    builder
        .add(RouteSpec::get("/weather/today", FnHandler(constant)))
        .unwrap();
    builder
        .add(RouteSpec::get("/weather/{location}", FnHandler(echo_param)))
        .unwrap();
    let registry = builder.build();

    let reply = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/weather/today"))
        .await
        .unwrap();
    assert_eq!(reply.body, json!({ "route": "static" }));

    let reply = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/weather/pune/"))
        .await
        .unwrap();
    assert_eq!(reply.body, json!({ "location": "pune" }));
}

#[tokio::test]
async fn test_body_validation_is_itemized() {
    let mut builder = Registry::builder();
    builder
        .add(
            RouteSpec::post("/detect-disease", FnHandler(echo_input)).body(
                Schema::object()
                    .field("image", FieldKind::Base64)
                    .field("crop_type", FieldKind::String)
                    .field("location", FieldKind::Object),
            ),
        )
        .unwrap();
    let registry = builder.build();

    let request = RequestEnvelope::new(Method::POST, "/detect-disease")
        .with_json(&json!({ "image": "aGVsbG8=", "location": {} }));
    let err = registry.dispatch(request).await.unwrap_err();
    match err {
        DispatchError::Validation(fields) => {
            assert_eq!(fields, vec![FieldError::new("crop_type", "field required")]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let request =
        RequestEnvelope::new(Method::POST, "/detect-disease").with_body("{not json");
    let err = registry.dispatch(request).await.unwrap_err();
    assert!(matches!(err, DispatchError::Validation(fields) if fields[0].field == "body"));
}

#[tokio::test]
async fn test_query_defaults_applied() {
    let mut builder = Registry::builder();
    builder
        .add(
            RouteSpec::get("/market-prices", FnHandler(echo_input)).query(
                Schema::object()
                    .with_default("crop", FieldKind::String, "rice")
                    .with_default("location", FieldKind::String, "delhi"),
            ),
        )
        .unwrap();
    let registry = builder.build();

    let query = [("crop".to_string(), "wheat".to_string())].into_iter().collect();
    let reply = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/market-prices").with_query(query))
        .await
        .unwrap();
    assert_eq!(reply.body, json!({ "crop": "wheat", "location": "delhi" }));
}

#[tokio::test]
async fn test_output_violation_is_internal() {
    let mut builder = Registry::builder();
    builder
        .add(
            RouteSpec::get("/", FnHandler(constant))
                .output(Schema::object().field("status", FieldKind::String)),
        )
        .unwrap();
    let registry = builder.build();

    let err = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Internal(msg) if msg.contains("output schema")));
}

#[tokio::test]
async fn test_handler_panic_is_internal() {
    let mut builder = Registry::builder();
    builder
        .add(RouteSpec::get("/boom", FnHandler(panicking)))
        .unwrap();
    let registry = builder.build();

    let err = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/boom"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Internal(msg) if msg.contains("handler bug")));
}

#[tokio::test]
async fn test_authentication_runs_before_validation() {
    let mut builder = Registry::builder().with_token_verifier(Arc::new(StaticVerifier));
    builder
        .add(
            RouteSpec::post("/me", WhoAmI)
                .body(Schema::object().field("name", FieldKind::String))
                .authenticated(),
        )
        .unwrap();
    let registry = builder.build();

    let err = registry
        .dispatch(RequestEnvelope::new(Method::POST, "/me"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Authentication(AuthFailure::Missing)));

    let mut headers = HeaderMap::new();
    headers.insert("authorization", "Bearer old".parse().unwrap());
    let err = registry
        .dispatch(RequestEnvelope::new(Method::POST, "/me").with_headers(headers))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Authentication(AuthFailure::Expired)));

    let mut headers = HeaderMap::new();
    headers.insert("authorization", "Bearer good".parse().unwrap());
    let reply = registry
        .dispatch(
            RequestEnvelope::new(Method::POST, "/me")
                .with_headers(headers)
                .with_json(&json!({ "name": "Asha" })),
        )
        .await
        .unwrap();
    assert_eq!(reply.body, json!({ "user_id": "farmer-1" }));
}

#[tokio::test]
async fn test_group_prefix_dispatch() {
    struct Irrigation;

    impl RouteGroup for Irrigation {
        fn name(&self) -> &'static str {
            "irrigation"
        }

        fn register(&self, scope: &mut GroupScope<'_>) -> Result<(), RegistryError> {
            scope.add(RouteSpec::get("/", FnHandler(constant)))?;
            scope.add(RouteSpec::get("/zones/{location}", FnHandler(echo_param)))
        }
    }

    let mut builder = Registry::builder();
    builder.mount("/api", &Irrigation).unwrap();
    let registry = builder.build();

    let templates: Vec<String> = registry.routes().map(|r| r.template).collect();
    assert_eq!(templates, vec!["/api/irrigation", "/api/irrigation/zones/{location}"]);
    assert!(registry.routes().all(|r| r.group == Some("irrigation")));

    let reply = registry
        .dispatch(RequestEnvelope::new(Method::GET, "/api/irrigation/zones/nashik"))
        .await
        .unwrap();
    assert_eq!(reply.body, json!({ "location": "nashik" }));
}

// ---------------------------------------------------------------------------
// 请求级事务
// ---------------------------------------------------------------------------

struct RecordHarvest {
    fail: bool,
}

#[async_trait]
impl RouteHandler for RecordHarvest {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        let tx = ctx.transaction().await?;
        sqlx::query("INSERT INTO harvests (crop) VALUES ('rice')")
            .execute(&mut **tx)
            .await?;
        if self.fail {
            return Err(HandlerError::internal("harvest ledger unavailable"));
        }
        Ok(Reply::ok(json!({ "recorded": true })))
    }
}

async fn harvest_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("CREATE TABLE harvests (crop TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    pool
}

async fn harvest_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM harvests")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_transaction_committed_on_success() {
    let pool = harvest_pool().await;
    let mut builder = Registry::builder().with_pool(pool.clone());
    builder
        .add(RouteSpec::post("/harvests", RecordHarvest { fail: false }))
        .unwrap();
    let registry = builder.build();

    registry
        .dispatch(RequestEnvelope::new(Method::POST, "/harvests"))
        .await
        .unwrap();
    assert_eq!(harvest_count(&pool).await, 1);
}

#[tokio::test]
async fn test_transaction_rolled_back_on_internal_error() {
    let pool = harvest_pool().await;
    let mut builder = Registry::builder().with_pool(pool.clone());
    builder
        .add(RouteSpec::post("/harvests", RecordHarvest { fail: true }))
        .unwrap();
    let registry = builder.build();

    let err = registry
        .dispatch(RequestEnvelope::new(Method::POST, "/harvests"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Internal(_)));
    assert_eq!(harvest_count(&pool).await, 0);
}

#[tokio::test]
async fn test_transaction_without_pool_is_dependency_error() {
    let mut builder = Registry::builder();
    builder
        .add(RouteSpec::post("/harvests", RecordHarvest { fail: false }))
        .unwrap();
    let registry = builder.build();

    let err = registry
        .dispatch(RequestEnvelope::new(Method::POST, "/harvests"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Dependency(_)));
}

#[tokio::test]
async fn test_registry_health_without_checker() {
    let registry = Registry::builder().build();
    assert!(registry.health().await.is_healthy());
}

#[test]
fn test_reads_body_only_for_body_schemas() {
    let mut builder = Registry::builder();
    builder
        .add(RouteSpec::post("/detect-disease", FnHandler(echo_input)).body(Schema::object()))
        .unwrap();
    builder
        .add(
            RouteSpec::get("/market-prices", FnHandler(echo_input))
                .query(Schema::object().with_default("crop", FieldKind::String, "rice")),
        )
        .unwrap();
    builder
        .add(RouteSpec::get("/weather/{location}", FnHandler(echo_param)))
        .unwrap();
    let registry = builder.build();

    assert!(registry.reads_body(&Method::POST, "/detect-disease").unwrap());
    assert!(!registry.reads_body(&Method::GET, "/market-prices").unwrap());
    assert!(!registry.reads_body(&Method::GET, "/weather/delhi").unwrap());

    assert!(matches!(
        registry.reads_body(&Method::POST, "/no-such-route"),
        Err(DispatchError::NotFound { .. })
    ));
    assert!(matches!(
        registry.reads_body(&Method::GET, "/detect-disease"),
        Err(DispatchError::MethodNotAllowed { .. })
    ));
}

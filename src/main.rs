//! AgriSmart - 农业助手后端
//!
//! 启动流程: 配置 → 日志 → 连接池 → 健康探针 → 路由表 → HTTP 服务器

use std::sync::Arc;
use std::time::Duration;

use agrismart::application::{HealthChecker, Registry};
use agrismart::config::{load_config, print_config, AppConfig};
use agrismart::infrastructure::http::{register_all, AppState, Capabilities, HttpServer, ServerConfig};
use agrismart::infrastructure::persistence::sqlite::DatabaseConfig as PoolConfig;
use agrismart::infrastructure::{create_pool, DatabaseProbe, JwtVerifier};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
    // 调试模式下默认 debug 级别
    let level = if config.server.debug && config.log.level == "info" {
        "debug"
    } else {
        config.log.level.as_str()
    };
    let log_filter = format!("{},agrismart={},tower_http=debug", level, level);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("AgriSmart AI - Intelligent Farming Assistant");
    print_config(&config);

    let mut checker = HealthChecker::new(env!("CARGO_PKG_VERSION"));
    let mut builder = Registry::builder()
        .with_token_verifier(Arc::new(JwtVerifier::new(
            config.jwt_secret(),
            config.auth.token_expiry_secs,
        )));

    if config.database.enabled {
        // 确保数据目录存在
        if let Some(parent) = config
            .database
            .file_path()
            .and_then(|p| std::path::Path::new(p).parent())
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let pool = create_pool(&PoolConfig {
            database_url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
        })?;
        checker = checker.with_probe(Arc::new(DatabaseProbe::new(pool.clone())));
        builder = builder.with_pool(pool);
    }

    let checker = Arc::new(checker);
    builder = builder.with_health(checker.clone());

    let caps = Capabilities::stubbed(checker);
    register_all(&mut builder, &caps, &config.server.api_prefix)?;
    let registry = builder.build();

    for route in registry.routes() {
        tracing::debug!(
            method = %route.method,
            template = %route.template,
            requires_auth = route.requires_auth,
            "Route"
        );
    }

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_cors(config.cors.clone());
    let state = AppState::new(registry, config.server.max_body_bytes, config.server.debug);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `AGRISMART_SERVER__PORT=8080`
/// - `AGRISMART_SERVER__DEBUG=true`
/// - `AGRISMART_SECURITY__SECRET_KEY=...`
/// - `AGRISMART_AUTH__JWT_SECRET=...`
/// - `AGRISMART_AUTH__TOKEN_EXPIRY_SECS=3600`
/// - `AGRISMART_DATABASE__URL=sqlite:/data/agrismart.db?mode=rwc`
/// - `AGRISMART_SERVER__MAX_BODY_BYTES=1048576`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("server.debug", false)?
        .set_default("server.max_body_bytes", 16 * 1024 * 1024)?
        .set_default("server.api_prefix", "/api")?
        .set_default("security.secret_key", "dev-secret-key")?
        .set_default("auth.token_expiry_secs", 86400)?
        .set_default("database.enabled", true)?
        .set_default("database.url", "sqlite:data/agrismart.db?mode=rwc")?
        .set_default("database.max_connections", 5)?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("cors.allowed_origins", vec!["*"])?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 前缀: AGRISMART_，层级分隔符: __
    // 列表值以逗号分隔，例如 AGRISMART_CORS__ALLOWED_ORIGINS=https://a.in,https://b.in
    builder = builder.add_source(
        Environment::with_prefix("AGRISMART")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("cors.allowed_origins")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.server.max_body_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Max body size cannot be 0".to_string(),
        ));
    }

    if !config.server.api_prefix.starts_with('/') {
        return Err(ConfigError::ValidationError(
            "API prefix must start with '/'".to_string(),
        ));
    }

    if config.jwt_secret().is_empty() {
        return Err(ConfigError::ValidationError(
            "Secret key cannot be empty".to_string(),
        ));
    }

    if config.auth.token_expiry_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Token expiry cannot be 0".to_string(),
        ));
    }

    if config.database.enabled && config.database.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database URL cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动日志），密钥不输出
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Debug: {}", config.server.debug);
    tracing::info!("Max Body Size: {} bytes", config.server.max_body_bytes);
    tracing::info!("API Prefix: {}", config.server.api_prefix);
    tracing::info!("Token Expiry: {}s", config.auth.token_expiry_secs);
    if config.database.enabled {
        tracing::info!("Database: {}", config.database.url);
        tracing::info!("Database Max Connections: {}", config.database.max_connections);
    } else {
        tracing::info!("Database: disabled");
    }
    tracing::info!("CORS Origins: {:?}", config.cors.allowed_origins);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");

    if config.security.secret_key == "dev-secret-key" && !config.server.debug {
        tracing::warn!("Using the default secret key outside debug mode");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_secret() {
        let mut config = AppConfig::default();
        config.security.secret_key = String::new();
        assert!(validate_config(&config).is_err());

        config.auth.jwt_secret = Some("jwt-secret-key".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_bad_prefix() {
        let mut config = AppConfig::default();
        config.server.api_prefix = "api".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_disabled_database_allows_empty_url() {
        let mut config = AppConfig::default();
        config.database.enabled = false;
        config.database.url = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000
debug = true
max_body_bytes = 1024

[auth]
jwt_secret = "file-secret"
token_expiry_secs = 600

[cors]
allowed_origins = ["https://agrismart.example"]
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.server.debug);
        assert_eq!(config.server.max_body_bytes, 1024);
        assert_eq!(config.jwt_secret(), "file-secret");
        assert_eq!(config.auth.token_expiry_secs, 600);
        assert!(!config.cors.allows_any_origin());
        assert_eq!(config.server.api_prefix, "/api");
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 0").unwrap();
        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}

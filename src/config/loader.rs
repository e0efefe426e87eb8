//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. `PORT` 环境变量（仅端口）
//! 2. `GRABBER_` 前缀环境变量
//! 3. 配置文件（config.toml）
//! 4. 默认值

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
/// - `PORT=8080`
/// - `GRABBER_SERVER__HOST=127.0.0.1`
/// - `GRABBER_EXTRACTOR__BINARY=/usr/local/bin/yt-dlp`
/// - `GRABBER_STORAGE__TEMP_DIR=/var/tmp/grabber`
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
    let defaults = AppConfig::default();
    builder = builder
        .set_default("server.host", defaults.server.host.clone())?
        .set_default("server.port", i64::from(defaults.server.port))?
        .set_default(
            "extractor.binary",
            defaults.extractor.binary.to_string_lossy().to_string(),
        )?
        .set_default("extractor.timeout_secs", defaults.extractor.timeout_secs as i64)?
        .set_default(
            "storage.temp_dir",
            defaults.storage.temp_dir.to_string_lossy().to_string(),
        )?
        .set_default("janitor.enabled", defaults.janitor.enabled)?
        .set_default("janitor.interval_secs", defaults.janitor.interval_secs as i64)?
        .set_default("janitor.max_age_secs", defaults.janitor.max_age_secs as i64)?
        .set_default("rate_limit.max_requests", i64::from(defaults.rate_limit.max_requests))?
        .set_default("rate_limit.window_secs", defaults.rate_limit.window_secs as i64)?
        .set_default("rate_limit.trusted_proxies", defaults.rate_limit.trusted_proxies as i64)?
        .set_default("log.level", defaults.log.level.clone())?
        .set_default("log.json", defaults.log.json)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量
    // 前缀: GRABBER_，层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("GRABBER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 部署平台通用的 PORT
    if let Ok(port) = std::env::var("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::ParseError(format!("Invalid PORT: {}", port)))?;
        builder = builder.set_override("server.port", i64::from(port))?;
    }

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

    if config.extractor.binary.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Extractor binary cannot be empty".to_string(),
        ));
    }

    if config.janitor.enabled && config.janitor.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Janitor interval cannot be 0 when janitor is enabled".to_string(),
        ));
    }

    if config.rate_limit.max_requests == 0 || config.rate_limit.window_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Rate limit max_requests and window_secs must be positive".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Extractor: {}", config.extractor.binary.display());
    if let Some(ffmpeg) = &config.extractor.ffmpeg_location {
        tracing::info!("FFmpeg Location: {}", ffmpeg.display());
    }
    if config.extractor.timeout_secs > 0 {
        tracing::info!("Extractor Timeout: {}s", config.extractor.timeout_secs);
    } else {
        tracing::info!("Extractor Timeout: unbounded");
    }
    tracing::info!("Temp Directory: {:?}", config.storage.temp_dir);
    tracing::info!("Janitor Enabled: {}", config.janitor.enabled);
    if config.janitor.enabled {
        tracing::info!("Janitor Interval: {}s", config.janitor.interval_secs);
        tracing::info!("Temp File Max Age: {}s", config.janitor.max_age_secs);
    }
    tracing::info!(
        "Rate Limit: {} requests / {}s",
        config.rate_limit.max_requests,
        config.rate_limit.window_secs
    );
    tracing::info!("Trusted Proxy Hops: {}", config.rate_limit.trusted_proxies);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
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
    fn test_validation_error_for_empty_binary() {
        let mut config = AppConfig::default();
        config.extractor.binary = Default::default();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_janitor_interval() {
        let mut config = AppConfig::default();
        config.janitor.interval_secs = 0;
        assert!(validate_config(&config).is_err());

        config.janitor.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_rate_limit() {
        let mut config = AppConfig::default();
        config.rate_limit.max_requests = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[extractor]\nbinary = \"/opt/yt-dlp\"\ntimeout_secs = 0\n\n[janitor]\nmax_age_secs = 60\n\n[rate_limit]\ntrusted_proxies = 1"
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.extractor.binary, std::path::PathBuf::from("/opt/yt-dlp"));
        assert_eq!(config.extractor.timeout_secs, 0);
        assert_eq!(config.janitor.max_age_secs, 60);
        assert_eq!(config.janitor.interval_secs, 600);
        assert_eq!(config.rate_limit.trusted_proxies, 1);
        assert_eq!(config.rate_limit.max_requests, 15);
    }
}

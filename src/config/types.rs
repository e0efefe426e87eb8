//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 外部提取工具配置
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// 临时文件存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// Janitor 配置
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// 限流配置
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// 外部提取工具（yt-dlp）配置
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// 可执行文件路径或名称
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// ffmpeg 位置，未设置时由 yt-dlp 自行查找
    #[serde(default)]
    pub ffmpeg_location: Option<PathBuf>,

    /// 单次调用超时时间（秒），0 表示不限制
    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,
}

fn default_binary() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_extractor_timeout() -> u64 {
    600 // 10 分钟
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            ffmpeg_location: None,
            timeout_secs: default_extractor_timeout(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 临时音频文件目录
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("grabber")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
        }
    }
}

/// Janitor 配置
#[derive(Debug, Clone, Deserialize)]
pub struct JanitorConfig {
    /// 是否启用定时清理
    #[serde(default = "default_janitor_enabled")]
    pub enabled: bool,

    /// 清理间隔（秒）
    #[serde(default = "default_janitor_interval")]
    pub interval_secs: u64,

    /// 文件最大存活时间（秒）
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_janitor_enabled() -> bool {
    true
}

fn default_janitor_interval() -> u64 {
    600 // 10 分钟
}

fn default_max_age() -> u64 {
    1800 // 30 分钟
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_janitor_enabled(),
            interval_secs: default_janitor_interval(),
            max_age_secs: default_max_age(),
        }
    }
}

/// 限流配置（每个客户端固定窗口计数）
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// 窗口内最大请求数
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// 窗口长度（秒）
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// 前置反向代理跳数；0 时只按对端地址限流
    #[serde(default)]
    pub trusted_proxies: usize,
}

fn default_max_requests() -> u32 {
    15
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trusted_proxies: 0,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.extractor.binary, PathBuf::from("yt-dlp"));
        assert_eq!(config.janitor.interval_secs, 600);
        assert_eq!(config.janitor.max_age_secs, 1800);
        assert_eq!(config.rate_limit.max_requests, 15);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.rate_limit.trusted_proxies, 0);
    }
}

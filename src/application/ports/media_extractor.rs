//! Media Extractor Port - 外部提取工具抽象
//!
//! 两种能力：解析直链、提取音频到文件。具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 工具正常退出但没有输出可用的直链（软失败）
    #[error("Could not resolve media URL")]
    NoMediaUrl,

    /// 工具非零退出
    #[error("{0}")]
    ProcessFailed(String),

    /// 超过配置的最长执行时间
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    /// 无法启动外部进程
    #[error("Failed to start extractor: {0}")]
    Spawn(String),
}

impl ExtractionError {
    /// 是否为软失败（HTTP 200 + success=false）
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::NoMediaUrl)
    }
}

/// 画质参数到格式选择器的映射
///
/// 目前所有取值（包括 "highest"）都映射到 "best"
pub fn format_selector(_quality: &str) -> &'static str {
    "best"
}

/// 从多行输出中取第一行 http(s) 链接
pub fn first_http_url(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| {
            let lower = line.to_ascii_lowercase();
            (lower.starts_with("http://") || lower.starts_with("https://"))
                && !line.contains(char::is_whitespace)
        })
        .map(str::to_string)
}

/// Media Extractor Port
#[async_trait]
pub trait MediaExtractorPort: Send + Sync {
    /// 解析直接可下载的媒体链接
    async fn resolve_direct_url(&self, url: &str, quality: &str)
        -> Result<String, ExtractionError>;

    /// 提取最佳音质音频，转码为 mp3 写入 `out_file`
    ///
    /// 调用方负责检查输出文件是否存在且非空
    async fn extract_audio(&self, url: &str, out_file: &Path) -> Result<(), ExtractionError>;
}

//! Fake Extractor - 用于测试的提取器
//!
//! 不启动任何外部进程，按配置返回固定结果

use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::{ExtractionError, MediaExtractorPort};

/// Fake Extractor
///
/// - `direct_url`: 直链模式返回的链接，None 时为软失败
/// - `audio`: 音频模式写入的字节，None 时不写文件
/// - `failure`: 设置后两种模式都以 ProcessFailed 失败
/// - `stall`: 音频模式写入 `<out>.part` 后永不返回
#[derive(Debug, Clone, Default)]
pub struct FakeExtractor {
    direct_url: Option<String>,
    audio: Option<Vec<u8>>,
    failure: Option<String>,
    stall: bool,
}

impl FakeExtractor {
    pub fn with_direct_url(mut self, url: impl Into<String>) -> Self {
        self.direct_url = Some(url.into());
        self
    }

    pub fn with_audio(mut self, bytes: Vec<u8>) -> Self {
        self.audio = Some(bytes);
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn stalling(mut self) -> Self {
        self.stall = true;
        self
    }
}

#[async_trait]
impl MediaExtractorPort for FakeExtractor {
    async fn resolve_direct_url(
        &self,
        url: &str,
        _quality: &str,
    ) -> Result<String, ExtractionError> {
        tracing::debug!(url = %url, "FakeExtractor: resolving");

        if let Some(message) = &self.failure {
            return Err(ExtractionError::ProcessFailed(message.clone()));
        }
        self.direct_url.clone().ok_or(ExtractionError::NoMediaUrl)
    }

    async fn extract_audio(&self, url: &str, out_file: &Path) -> Result<(), ExtractionError> {
        tracing::debug!(url = %url, out_file = %out_file.display(), "FakeExtractor: extracting");

        if let Some(message) = &self.failure {
            return Err(ExtractionError::ProcessFailed(message.clone()));
        }
        if self.stall {
            let mut partial = out_file.as_os_str().to_owned();
            partial.push(".part");
            tokio::fs::write(&partial, b"partial")
                .await
                .map_err(|e| ExtractionError::ProcessFailed(e.to_string()))?;
            std::future::pending::<()>().await;
        }
        if let Some(bytes) = &self.audio {
            tokio::fs::write(out_file, bytes)
                .await
                .map_err(|e| ExtractionError::ProcessFailed(e.to_string()))?;
        }
        Ok(())
    }
}

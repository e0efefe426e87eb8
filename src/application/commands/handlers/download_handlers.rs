//! Download Command Handler
//!
//! 校验 -> 按格式分支：直链解析，或提取音频到临时文件

use std::sync::Arc;

use crate::application::commands::DownloadMedia;
use crate::application::error::ApplicationError;
use crate::application::ports::{ExtractionError, MediaExtractorPort, TempFileStorePort};
use crate::domain::download::{validate, FileId, MediaFormat};

/// 音频文件缺失或为空时返回给客户端的消息
pub const MP3_CONVERSION_FAILED: &str = "MP3 conversion failed";

const DEFAULT_QUALITY: &str = "best";

/// 生成 ID 时的最大重试次数（与现存文件撞名）
const MAX_ID_ATTEMPTS: usize = 8;

/// 下载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 直链
    DirectUrl(String),
    /// 已写入临时存储的音频文件
    AudioFile(FileId),
    /// 软失败：工具执行完毕但没有可用结果
    Unavailable(String),
}

/// Download Handler
pub struct DownloadHandler {
    extractor: Arc<dyn MediaExtractorPort>,
    store: Arc<dyn TempFileStorePort>,
}

impl DownloadHandler {
    pub fn new(extractor: Arc<dyn MediaExtractorPort>, store: Arc<dyn TempFileStorePort>) -> Self {
        Self { extractor, store }
    }

    pub async fn handle(&self, command: DownloadMedia) -> Result<DownloadOutcome, ApplicationError> {
        let url = command.url.unwrap_or_default().trim().to_string();
        let platform = validate(command.platform.as_deref().unwrap_or_default(), &url)?;
        let format = MediaFormat::from_request(command.format.as_deref());
        let quality = command
            .quality
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_QUALITY.to_string());

        tracing::info!(
            platform = %platform,
            format = format.as_str(),
            quality = %quality,
            url = %url,
            "Download requested"
        );

        match format {
            MediaFormat::Mp4 => self.resolve(&url, &quality).await,
            MediaFormat::Mp3 => self.extract(&url).await,
        }
    }

    async fn resolve(&self, url: &str, quality: &str) -> Result<DownloadOutcome, ApplicationError> {
        match self.extractor.resolve_direct_url(url, quality).await {
            Ok(direct) => Ok(DownloadOutcome::DirectUrl(direct)),
            Err(e) if e.is_soft() => {
                tracing::info!(url = %url, "No direct media URL resolved");
                Ok(DownloadOutcome::Unavailable(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn extract(&self, url: &str) -> Result<DownloadOutcome, ApplicationError> {
        let id = self.fresh_id().await?;
        let out_file = self.store.path_for(&id);
        let pending = PendingOutput::new(self.store.clone(), id.clone());

        if let Err(e) = self.extractor.extract_audio(url, &out_file).await {
            pending.discard().await;
            return match e {
                ExtractionError::NoMediaUrl => {
                    Ok(DownloadOutcome::Unavailable(MP3_CONVERSION_FAILED.to_string()))
                }
                other => Err(other.into()),
            };
        }

        if !self.store.is_ready(&id).await {
            tracing::warn!(file_id = %id, url = %url, "Extractor produced no audio output");
            pending.discard().await;
            return Ok(DownloadOutcome::Unavailable(MP3_CONVERSION_FAILED.to_string()));
        }

        pending.keep();
        tracing::info!(file_id = %id, "Audio file ready");
        Ok(DownloadOutcome::AudioFile(id))
    }

    /// 生成一个当前未被占用的 ID
    async fn fresh_id(&self) -> Result<FileId, ApplicationError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = FileId::generate();
            let taken = tokio::fs::try_exists(self.store.path_for(&id))
                .await
                .unwrap_or(false);
            if !taken {
                return Ok(id);
            }
        }
        Err(ApplicationError::Storage(
            "Could not allocate a temp file id".to_string(),
        ))
    }
}

/// 提取中的输出文件
///
/// 请求 future 在提取途中被 drop（客户端断开）时，后台清理 `<id>.*` 中间文件。
/// 成功后调用 `keep` 解除
struct PendingOutput {
    store: Arc<dyn TempFileStorePort>,
    id: Option<FileId>,
}

impl PendingOutput {
    fn new(store: Arc<dyn TempFileStorePort>, id: FileId) -> Self {
        Self {
            store,
            id: Some(id),
        }
    }

    fn keep(mut self) {
        self.id = None;
    }

    async fn discard(mut self) {
        if let Some(id) = self.id.take() {
            self.store.discard(&id).await;
        }
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        tracing::debug!(file_id = %id, "Extraction abandoned, discarding partial output");
        let store = self.store.clone();
        handle.spawn(async move {
            store.discard(&id).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{FakeExtractor, FsTempFileStore};
    use tempfile::tempdir;

    async fn handler_with(
        extractor: FakeExtractor,
        dir: &std::path::Path,
    ) -> (DownloadHandler, Arc<FsTempFileStore>) {
        let store = Arc::new(FsTempFileStore::new(dir).await.unwrap());
        (DownloadHandler::new(Arc::new(extractor), store.clone()), store)
    }

    fn command(platform: &str, url: &str, format: Option<&str>) -> DownloadMedia {
        DownloadMedia {
            platform: Some(platform.to_string()),
            url: Some(url.to_string()),
            format: format.map(str::to_string),
            quality: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_platform() {
        let dir = tempdir().unwrap();
        let (handler, _) = handler_with(FakeExtractor::default(), dir.path()).await;

        let err = handler
            .handle(command("foo", "https://youtu.be/abc123", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid platform.");
    }

    #[tokio::test]
    async fn test_missing_fields_are_validation_errors() {
        let dir = tempdir().unwrap();
        let (handler, _) = handler_with(FakeExtractor::default(), dir.path()).await;

        let err = handler.handle(DownloadMedia::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid platform.");

        let err = handler
            .handle(DownloadMedia {
                platform: Some("youtube".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid URL.");
    }

    #[tokio::test]
    async fn test_direct_url_default_format() {
        let dir = tempdir().unwrap();
        let extractor = FakeExtractor::default().with_direct_url("https://cdn.example/v.mp4");
        let (handler, _) = handler_with(extractor, dir.path()).await;

        let outcome = handler
            .handle(command("YouTube", "https://youtu.be/abc123", None))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::DirectUrl("https://cdn.example/v.mp4".to_string())
        );
    }

    #[tokio::test]
    async fn test_direct_url_soft_failure() {
        let dir = tempdir().unwrap();
        let (handler, _) = handler_with(FakeExtractor::default(), dir.path()).await;

        let outcome = handler
            .handle(command("tiktok", "https://www.tiktok.com/@u/video/1", Some("mp4")))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Unavailable("Could not resolve media URL".to_string())
        );
    }

    #[tokio::test]
    async fn test_direct_url_hard_failure() {
        let dir = tempdir().unwrap();
        let extractor = FakeExtractor::default().failing("ERROR: Unsupported URL");
        let (handler, _) = handler_with(extractor, dir.path()).await;

        let err = handler
            .handle(command("twitter", "https://x.com/u/status/1", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Extraction(_)));
        assert_eq!(err.to_string(), "ERROR: Unsupported URL");
    }

    #[tokio::test]
    async fn test_mp3_writes_file() {
        let dir = tempdir().unwrap();
        let extractor = FakeExtractor::default().with_audio(b"ID3 fake audio".to_vec());
        let (handler, store) = handler_with(extractor, dir.path()).await;

        let outcome = handler
            .handle(command("youtube", "https://youtu.be/abc123", Some("MP3")))
            .await
            .unwrap();
        let id = match outcome {
            DownloadOutcome::AudioFile(id) => id,
            other => panic!("expected audio file, got {:?}", other),
        };
        assert!(store.is_ready(&id).await);
        assert_eq!(
            std::fs::read(store.path_for(&id)).unwrap(),
            b"ID3 fake audio"
        );
    }

    #[tokio::test]
    async fn test_mp3_empty_output_is_soft_failure() {
        let dir = tempdir().unwrap();
        let extractor = FakeExtractor::default().with_audio(Vec::new());
        let (handler, _) = handler_with(extractor, dir.path()).await;

        let outcome = handler
            .handle(command("instagram", "https://www.instagram.com/reel/x", Some("mp3")))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Unavailable(MP3_CONVERSION_FAILED.to_string())
        );
        // 空文件已被清理
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_extraction_removes_partial_output() {
        let dir = tempdir().unwrap();
        let (handler, _) = handler_with(FakeExtractor::default().stalling(), dir.path()).await;

        // 客户端断开：请求 future 在提取途中被丢弃
        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            handler.handle(command("youtube", "https://youtu.be/abc123", Some("mp3"))),
        )
        .await;
        assert!(abandoned.is_err());

        let mut remaining = usize::MAX;
        for _ in 0..100 {
            remaining = std::fs::read_dir(dir.path()).unwrap().count();
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_mp3_success_keeps_output() {
        let dir = tempdir().unwrap();
        let extractor = FakeExtractor::default().with_audio(b"ID3".to_vec());
        let (handler, store) = handler_with(extractor, dir.path()).await;

        let outcome = handler
            .handle(command("youtube", "https://youtu.be/abc123", Some("mp3")))
            .await
            .unwrap();
        let id = match outcome {
            DownloadOutcome::AudioFile(id) => id,
            other => panic!("expected audio file, got {:?}", other),
        };

        // 守卫已解除，没有后台清理
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(store.is_ready(&id).await);
    }

    #[tokio::test]
    async fn test_mp3_missing_output_is_soft_failure() {
        let dir = tempdir().unwrap();
        let (handler, _) = handler_with(FakeExtractor::default(), dir.path()).await;

        let outcome = handler
            .handle(command("youtube", "https://youtu.be/abc123", Some("mp3")))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Unavailable(MP3_CONVERSION_FAILED.to_string())
        );
    }
}

//! Temp File Store - 文件系统临时音频存储
//!
//! 实现 TempFileStorePort trait
//!
//! 目录布局:
//! - `<id>.mp3`                     提取完成、等待领取
//! - `<id>.<nonce>.claimed.mp3`     已被领取、正在发送（发送结束即删除）
//! - `<id>.mp3.part` 等             提取中断的残留，由 discard 或 sweep 清理
//!
//! 清洗后的 ID 不含 `.`，因此已领取的文件无法再通过 ID 访问

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{
    ClaimedFile, SweepReport, TempFileError, TempFileStorePort, PARTIAL_FILE_EXT, TEMP_FILE_EXT,
};
use crate::domain::download::FileId;

/// 文件系统临时文件存储
pub struct FsTempFileStore {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FsTempFileStore {
    /// 创建新的存储，目录不存在时自动创建
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, TempFileError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir).await?;

        Ok(Self { base_dir })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn claimed_path(&self, id: &FileId) -> PathBuf {
        self.base_dir.join(format!(
            "{}.{}.claimed.{}",
            id,
            Uuid::new_v4().simple(),
            TEMP_FILE_EXT
        ))
    }
}

#[async_trait]
impl TempFileStorePort for FsTempFileStore {
    fn path_for(&self, id: &FileId) -> PathBuf {
        self.base_dir.join(format!("{}.{}", id, TEMP_FILE_EXT))
    }

    async fn is_ready(&self, id: &FileId) -> bool {
        fs::metadata(self.path_for(id))
            .await
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    async fn claim(&self, id: &FileId) -> Result<ClaimedFile, TempFileError> {
        let source = self.path_for(id);
        let claimed = self.claimed_path(id);

        // rename 是原子的：并发领取时只有一个请求成功
        fs::rename(&source, &claimed).await?;

        let file = match fs::File::open(&claimed).await {
            Ok(file) => file,
            Err(e) => {
                let _ = fs::remove_file(&claimed).await;
                return Err(e.into());
            }
        };
        let size = file.metadata().await.map(|m| m.len()).unwrap_or(0);

        tracing::debug!(file_id = %id, size, "Temp file claimed");

        Ok(ClaimedFile::new(id.clone(), file, size, claimed))
    }

    async fn discard(&self, id: &FileId) {
        let _ = fs::remove_file(self.path_for(id)).await;

        // yt-dlp 失败时可能留下 `<id>.mp3.part`、`<id>.webm` 等中间文件
        let prefix = format!("{}.", id);
        let Ok(mut entries) = fs::read_dir(&self.base_dir).await else {
            return;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let is_leftover = name
                .to_str()
                .map_or(false, |n| n.starts_with(&prefix) && !n.contains(".claimed."));
            if is_leftover {
                let _ = fs::remove_file(entry.path()).await;
            }
        }
    }

    async fn sweep(&self, max_age: Duration) -> SweepReport {
        let mut report = SweepReport::default();

        let Ok(mut entries) = fs::read_dir(&self.base_dir).await else {
            return report;
        };

        let now = SystemTime::now();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let swept = path
                .extension()
                .map_or(false, |ext| ext == TEMP_FILE_EXT || ext == PARTIAL_FILE_EXT);
            if !swept {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            report.scanned += 1;

            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age > max_age && fs::remove_file(&path).await.is_ok() {
                report.removed += 1;
            }
        }

        report
    }
}

//! Temp File Store Port - 临时音频文件存储
//!
//! 生命周期：按需创建 -> 只服务一次 -> 发送后删除；未被领取的由 Janitor 兜底清理

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::domain::download::FileId;

/// 临时文件扩展名
pub const TEMP_FILE_EXT: &str = "mp3";

/// yt-dlp 未完成下载的后缀，中断后残留
pub const PARTIAL_FILE_EXT: &str = "part";

/// 临时文件存储错误
#[derive(Debug, Error)]
pub enum TempFileError {
    #[error("File not found")]
    NotFound,

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TempFileError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(err.to_string())
        }
    }
}

/// 已被领取的临时文件
///
/// 文件句柄已打开；值被 drop 时尽力删除磁盘文件
pub struct ClaimedFile {
    pub id: FileId,
    pub file: tokio::fs::File,
    pub size: u64,
    guard: DeleteOnDrop,
}

impl ClaimedFile {
    /// `path` 为领取后的实际磁盘路径
    pub fn new(id: FileId, file: tokio::fs::File, size: u64, path: PathBuf) -> Self {
        Self {
            id,
            file,
            size,
            guard: DeleteOnDrop::new(path),
        }
    }

    /// 拆分为文件句柄和删除守卫
    pub fn into_parts(self) -> (tokio::fs::File, DeleteOnDrop) {
        (self.file, self.guard)
    }
}

/// drop 时删除路径，失败静默
#[derive(Debug)]
pub struct DeleteOnDrop(PathBuf);

impl DeleteOnDrop {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Drop for DeleteOnDrop {
    fn drop(&mut self) {
        // 阻塞 unlink：只删目录项、不碰文件内容，关闭 runtime 时也必须执行
        match std::fs::remove_file(&self.0) {
            Ok(()) => tracing::debug!(path = %self.0.display(), "Temp file deleted after send"),
            Err(e) => tracing::debug!(path = %self.0.display(), error = %e, "Temp file cleanup skipped"),
        }
    }
}

/// 清理结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 扫描到的目标扩展名文件数（含 `.part`）
    pub scanned: u64,
    /// 删除的文件数
    pub removed: u64,
}

/// Temp File Store Port
#[async_trait]
pub trait TempFileStorePort: Send + Sync {
    /// 根据 ID 得到输出路径（确定性）
    fn path_for(&self, id: &FileId) -> PathBuf;

    /// 文件存在且非空
    async fn is_ready(&self, id: &FileId) -> bool;

    /// 领取文件：之后同一 ID 再次领取返回 NotFound
    async fn claim(&self, id: &FileId) -> Result<ClaimedFile, TempFileError>;

    /// 尽力删除，文件不存在视为成功
    async fn discard(&self, id: &FileId);

    /// 删除早于 `max_age` 的音频文件和 `.part` 残留，错误静默
    async fn sweep(&self, max_age: Duration) -> SweepReport;
}

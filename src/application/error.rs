//! 应用层错误定义

use thiserror::Error;

use crate::application::ports::ExtractionError;
use crate::domain::download::ValidationError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求校验失败（平台或 URL）
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 外部提取工具异常（非软失败）
    #[error("{0}")]
    Extraction(String),

    /// 临时文件存储错误
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ExtractionError> for ApplicationError {
    fn from(err: ExtractionError) -> Self {
        Self::Extraction(err.to_string())
    }
}

//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 端口定义（MediaExtractor、TempFileStore）
//! - commands: 下载命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

pub use commands::{
    handlers::{DownloadHandler, DownloadOutcome, MP3_CONVERSION_FAILED},
    DownloadMedia,
};
pub use error::ApplicationError;
pub use ports::{
    ClaimedFile, ExtractionError, MediaExtractorPort, SweepReport, TempFileError,
    TempFileStorePort,
};

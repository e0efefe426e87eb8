//! Application State

use std::sync::Arc;

use crate::application::{DownloadHandler, MediaExtractorPort, TempFileStorePort};

/// 应用状态
///
/// 请求之间除文件系统外没有共享的可变状态
pub struct AppState {
    pub temp_store: Arc<dyn TempFileStorePort>,
    pub download_handler: DownloadHandler,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn MediaExtractorPort>,
        temp_store: Arc<dyn TempFileStorePort>,
    ) -> Self {
        Self {
            temp_store: temp_store.clone(),
            download_handler: DownloadHandler::new(extractor, temp_store),
        }
    }
}

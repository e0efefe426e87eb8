//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod media_extractor;
mod temp_file_store;

pub use media_extractor::{first_http_url, format_selector, ExtractionError, MediaExtractorPort};
pub use temp_file_store::{
    ClaimedFile, DeleteOnDrop, SweepReport, TempFileError, TempFileStorePort, PARTIAL_FILE_EXT,
    TEMP_FILE_EXT,
};

//! Storage Adapter - 文件系统临时文件存储

mod temp_file_store;

pub use temp_file_store::FsTempFileStore;

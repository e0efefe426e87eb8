//! Grabber - 社交媒体下载网关
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Download Context: 平台/URL 白名单校验、临时文件 ID
//!
//! 应用层 (application/):
//! - Ports: MediaExtractor（外部 yt-dlp）、TempFileStore（临时 mp3）
//! - Commands: 下载命令处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 限流
//! - Adapters: yt-dlp 进程适配器、文件系统临时存储
//! - Worker: Janitor 定时清理

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

//! Commands - CQRS 命令定义

mod download_commands;
pub mod handlers;

pub use download_commands::DownloadMedia;

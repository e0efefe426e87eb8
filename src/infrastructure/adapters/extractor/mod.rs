//! Extractor Adapter - 外部媒体提取工具

mod fake_extractor;
mod yt_dlp_extractor;

pub use fake_extractor::FakeExtractor;
pub use yt_dlp_extractor::{YtDlpExtractor, YtDlpExtractorConfig};

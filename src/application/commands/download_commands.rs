//! Download Commands

/// 下载命令
///
/// 字段与请求体一一对应，缺省值在处理器中补齐
#[derive(Debug, Clone, Default)]
pub struct DownloadMedia {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub format: Option<String>,
    pub quality: Option<String>,
}

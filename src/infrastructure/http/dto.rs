//! Data Transfer Objects

use serde::{Deserialize, Serialize};

/// 下载请求体
///
/// 所有字段均可缺省，缺省值与校验由应用层处理
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
}

/// 统一响应信封
///
/// `success=false` 且 HTTP 200 表示调用成功但没有可用结果（软失败）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DownloadResponse {
    /// 成功响应
    pub fn success(download_url: impl Into<String>) -> Self {
        Self {
            success: true,
            download_url: Some(download_url.into()),
            message: None,
        }
    }

    /// 失败响应
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            download_url: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(DownloadResponse::success("https://a/b")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "downloadUrl": "https://a/b"})
        );
    }

    #[test]
    fn test_failure_envelope() {
        let json = serde_json::to_value(DownloadResponse::failure("Invalid URL.")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "Invalid URL."})
        );
    }

    #[test]
    fn test_request_fields_optional() {
        let req: DownloadRequest = serde_json::from_str(r#"{"platform":"youtube"}"#).unwrap();
        assert_eq!(req.platform.as_deref(), Some("youtube"));
        assert!(req.url.is_none());
        assert!(req.format.is_none());
    }
}

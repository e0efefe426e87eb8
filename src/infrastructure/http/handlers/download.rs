//! Download Handler
//!
//! POST /api/download

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    Json,
};
use std::sync::Arc;

use crate::application::{DownloadMedia, DownloadOutcome};
use crate::infrastructure::http::dto::{DownloadRequest, DownloadResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 提交下载请求
///
/// - mp4（默认）：返回直链
/// - mp3：提取音频到临时文件，返回 `/file/{id}` 链接
pub async fn download(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let Json(req) = payload?;

    let command = DownloadMedia {
        platform: req.platform,
        url: req.url,
        format: req.format,
        quality: req.quality,
    };

    let response = match state.download_handler.handle(command).await? {
        DownloadOutcome::DirectUrl(url) => DownloadResponse::success(url),
        DownloadOutcome::AudioFile(id) => {
            DownloadResponse::success(format!("{}/file/{}", request_origin(&headers), id))
        }
        DownloadOutcome::Unavailable(message) => DownloadResponse::failure(message),
    };

    Ok(Json(response))
}

/// 根据代理头推断对外访问的 origin
///
/// 协议: X-Forwarded-Proto，缺省 https；主机: X-Forwarded-Host，缺省 Host
pub fn request_origin(headers: &HeaderMap) -> String {
    let first_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let proto = first_value("x-forwarded-proto").unwrap_or_else(|| "https".to_string());
    let host = first_value("x-forwarded-host")
        .or_else(|| first_value(header::HOST.as_str()))
        .unwrap_or_else(|| "localhost".to_string());

    format!("{}://{}", proto, host)
}

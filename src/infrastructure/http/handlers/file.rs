//! Temp File Handler
//!
//! GET /file/:id - 只服务一次，发送结束（或连接中断）后删除

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::TempFileError;
use crate::domain::download::FileId;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 下载临时音频文件
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = FileId::sanitize(&raw_id).ok_or(ApiError::NotFound)?;

    let claimed = state.temp_store.claim(&id).await.map_err(|e| match e {
        TempFileError::NotFound => ApiError::NotFound,
        TempFileError::Io(msg) => ApiError::Internal(msg),
    })?;

    let size = claimed.size;
    let (file, guard) = claimed.into_parts();

    // guard 随 body 一起释放：发送完成或客户端断开时删除文件
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _ = &guard;
        chunk
    });

    tracing::info!(file_id = %id, size, "Serving temp file");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.mp3\"", id),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

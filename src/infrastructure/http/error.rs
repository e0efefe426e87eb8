//! HTTP Error Handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::DownloadResponse;
use crate::application::ApplicationError;

/// 错误消息最大长度（字符）
pub const MAX_ERROR_MESSAGE_LEN: usize = 400;

/// 错误消息为空时的兜底文本
pub const GENERIC_ERROR_MESSAGE: &str = "Server error";

/// 文件路由 404 文本
pub const FILE_NOT_FOUND_MESSAGE: &str = "File not found";

/// 截断错误消息，空消息使用兜底文本
pub fn truncate_message(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        return GENERIC_ERROR_MESSAGE.to_string();
    }
    message.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    /// 400，消息原样返回
    BadRequest(String),
    /// 404，纯文本
    NotFound,
    /// 500，消息截断
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, Json(DownloadResponse::failure(msg))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, FILE_NOT_FOUND_MESSAGE).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(DownloadResponse::failure(truncate_message(&msg))),
                )
                    .into_response()
            }
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Validation(err) => ApiError::BadRequest(err.to_string()),
            ApplicationError::Extraction(msg) => ApiError::Internal(msg),
            ApplicationError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e.body_text(), "Rejected request body");
        ApiError::BadRequest("Invalid request body.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::download::ValidationError;

    #[test]
    fn test_truncate_message() {
        let long = "x".repeat(1000);
        assert_eq!(truncate_message(&long).chars().count(), MAX_ERROR_MESSAGE_LEN);
        assert_eq!(truncate_message("  "), GENERIC_ERROR_MESSAGE);
        assert_eq!(truncate_message("boom"), "boom");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "音".repeat(500);
        assert_eq!(truncate_message(&long).chars().count(), MAX_ERROR_MESSAGE_LEN);
    }

    #[test]
    fn test_status_mapping() {
        let validation: ApiError = ApplicationError::Validation(ValidationError::InvalidUrl).into();
        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);

        let internal: ApiError = ApplicationError::Extraction("crash".into()).into();
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }
}

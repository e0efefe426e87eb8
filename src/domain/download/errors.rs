//! Download Context - Errors

use thiserror::Error;

/// 请求校验错误
///
/// Display 文本直接返回给客户端
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid platform.")]
    InvalidPlatform,

    #[error("Invalid URL.")]
    InvalidUrl,
}

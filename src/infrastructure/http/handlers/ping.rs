//! Health Check Handler

/// 健康检查响应体
pub const HEALTH_BODY: &str = "Backend OK";

/// 健康检查 - 恒定 200
pub async fn health() -> &'static str {
    HEALTH_BODY
}

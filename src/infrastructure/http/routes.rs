//! HTTP Routes
//!
//! API Endpoints:
//! - /                  GET   健康检查
//! - /api/download      POST  提交下载（直链或 mp3 临时文件链接）
//! - /file/:id          GET   领取 mp3 临时文件（只能下载一次）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::health))
        .nest("/api", api_routes())
        .route("/file/:id", get(handlers::serve_file))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/download", post(handlers::download))
}

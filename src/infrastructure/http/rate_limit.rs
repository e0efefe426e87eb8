//! Rate Limiter
//!
//! 每客户端固定窗口计数，作用于所有路由之前。
//! 响应头使用标准 `RateLimit-*`，不发送旧式 `X-RateLimit-*`

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::dto::DownloadResponse;
use crate::config::RateLimitConfig;

pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// 超过该数量时清理过期桶
const PURGE_THRESHOLD: usize = 10_000;

const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// 一次限流判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// 距窗口重置的时间
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// 重置秒数（向上取整，至少 1）
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        let secs = if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        };
        secs.max(1)
    }

    fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from(self.reset_secs()));
    }
}

/// 内存限流器
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    max_requests: u32,
    window: Duration,
    /// 前置可信代理跳数，0 表示忽略 X-Forwarded-For
    trusted_proxies: usize,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            max_requests,
            window,
            trusted_proxies: 0,
        }
    }

    pub fn with_trusted_proxies(mut self, hops: usize) -> Self {
        self.trusted_proxies = hops;
        self
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
            .with_trusted_proxies(config.trusted_proxies)
    }

    /// 记一次请求并判定是否放行
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();

        if self.buckets.len() > PURGE_THRESHOLD {
            self.buckets.retain(|_, bucket| bucket.reset_at > now);
        }

        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            reset_at: now + self.window,
        });

        if now >= bucket.reset_at {
            bucket.count = 0;
            bucket.reset_at = now + self.window;
        }

        let allowed = bucket.count < self.max_requests;
        if allowed {
            bucket.count += 1;
        }

        RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(bucket.count),
            reset_after: bucket.reset_at.saturating_duration_since(now),
        }
    }
}

/// 客户端标识
///
/// 默认取对端地址。配置了 `trusted_proxies` 时，从 X-Forwarded-For 右端
/// 倒数第 `trusted_proxies` 项取客户端地址（最右项由最近一跳代理写入），
/// 更左侧的内容由客户端控制，不参与判定。链长不足或该项不是合法 IP
/// 时退回对端地址；都没有时为 "unknown"
pub fn client_key(request: &Request, trusted_proxies: usize) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    if trusted_proxies > 0 {
        if let Some(ip) = forwarded_client(request.headers(), trusted_proxies) {
            return ip.to_string();
        }
    }

    peer.unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client(headers: &HeaderMap, trusted_proxies: usize) -> Option<IpAddr> {
    let entries: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    let index = entries.len().checked_sub(trusted_proxies)?;
    entries.get(index)?.parse().ok()
}

/// 限流中间件
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request, limiter.trusted_proxies);
    let decision = limiter.check(&key);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::info!(client = %key, uri = %request.uri(), "Rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(DownloadResponse::failure(TOO_MANY_REQUESTS_MESSAGE)),
        )
            .into_response();
        response.headers_mut().insert(
            axum::http::header::RETRY_AFTER,
            HeaderValue::from(decision.reset_secs()),
        );
        response
    };

    decision.apply_headers(response.headers_mut());
    response
}

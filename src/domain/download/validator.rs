//! Request Validator
//!
//! 纯语法校验：平台白名单 + URL 主机白名单，不访问网络

use url::Url;

use super::{Platform, ValidationError};

/// 允许的 URL 主机（小写）
pub const ALLOWED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
    "instagram.com",
    "www.instagram.com",
    "tiktok.com",
    "www.tiktok.com",
    "m.tiktok.com",
    "vm.tiktok.com",
    "vt.tiktok.com",
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
];

/// 校验平台与 URL
///
/// 平台先于 URL 校验；两者互不关联（平台合法与否不影响主机检查）
pub fn validate(platform: &str, url: &str) -> Result<Platform, ValidationError> {
    let platform = platform.parse::<Platform>()?;

    let parsed = Url::parse(url.trim()).map_err(|_| ValidationError::InvalidUrl)?;
    let host = parsed
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or(ValidationError::InvalidUrl)?;

    if !ALLOWED_HOSTS.contains(&host.as_str()) {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(platform)
}

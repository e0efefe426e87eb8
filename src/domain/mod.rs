//! Domain Layer
//!
//! - download: 下载请求值对象、平台/主机白名单校验

pub mod download;

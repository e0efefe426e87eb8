//! Worker Layer - Background Task Processing
//!
//! 实现 Janitor，定时清理未被领取的临时文件

mod janitor;

pub use janitor::{Janitor, JanitorConfig};

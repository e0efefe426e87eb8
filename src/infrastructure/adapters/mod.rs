//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod extractor;
pub mod storage;

pub use extractor::*;
pub use storage::*;

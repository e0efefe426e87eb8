//! Download Context
//!
//! 下载请求的值对象、白名单校验与错误定义

mod errors;
mod validator;
mod value_objects;

pub use errors::ValidationError;
pub use validator::{validate, ALLOWED_HOSTS};
pub use value_objects::{FileId, MediaFormat, Platform, FILE_ID_LEN};

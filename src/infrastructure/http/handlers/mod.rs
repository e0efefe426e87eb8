//! HTTP Handlers

mod download;
mod file;
mod ping;

pub use download::*;
pub use file::*;
pub use ping::*;

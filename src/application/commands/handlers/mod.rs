//! Command Handlers

mod download_handlers;

pub use download_handlers::{DownloadHandler, DownloadOutcome, MP3_CONVERSION_FAILED};

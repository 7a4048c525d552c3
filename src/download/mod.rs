//! Concurrent retrieval of every object below resolved survey prefixes.
//!
//! # Features
//!
//! - Page-bounded concurrency (one task per object on the current page)
//! - Local tree mirrors the remote key hierarchy
//! - Re-runs overwrite existing files in place
//! - Shared atomic progress counters for progress displays

mod engine;
mod error;

pub use engine::{BatchDownloader, DownloadStats, local_path};
pub use error::DownloadError;

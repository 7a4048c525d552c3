//! Error types for batch downloads.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that abort a batch download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Listing or retrieval failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The key cannot be mapped onto a path inside the target directory.
    #[error("refusing to download {key}: key does not map to a path inside the target")]
    UnsafeKey {
        /// The offending object key.
        key: String,
    },

    /// A retrieval task panicked or was cancelled by the runtime.
    #[error("retrieval task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DownloadError {
    /// Creates an unsafe-key error.
    pub fn unsafe_key(key: impl Into<String>) -> Self {
        Self::UnsafeKey { key: key.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsafe_key_display() {
        let error = DownloadError::unsafe_key("mb/../../etc/passwd");
        let msg = error.to_string();
        assert!(msg.contains("mb/../../etc/passwd"), "Expected key in: {msg}");
    }

    #[test]
    fn test_store_error_is_transparent() {
        let error = DownloadError::from(StoreError::retrieval("bucket", "mb/k", "reset"));
        assert_eq!(
            error.to_string(),
            "failed to retrieve s3://bucket/mb/k: reset"
        );
    }
}

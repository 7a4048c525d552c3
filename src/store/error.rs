//! Error types for the object store module.
//!
//! Every variant carries the bucket/prefix/key or local path it concerns so
//! the message is actionable without a backtrace.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed transport error from the underlying storage client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while listing or retrieving objects.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A listing call failed (transport, auth, throttling, missing bucket).
    #[error("failed to list s3://{bucket}/{prefix}: {source}")]
    Listing {
        /// Bucket being listed.
        bucket: String,
        /// Prefix being listed.
        prefix: String,
        /// The underlying client error.
        #[source]
        source: BoxError,
    },

    /// Fetching or streaming an object body failed.
    #[error("failed to retrieve s3://{bucket}/{key}: {source}")]
    Retrieval {
        /// Bucket holding the object.
        bucket: String,
        /// Key of the object.
        key: String,
        /// The underlying client or stream error.
        #[source]
        source: BoxError,
    },

    /// Local file system error while writing an object.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The local path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Creates a listing error.
    pub fn listing(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Listing {
            bucket: bucket.into(),
            prefix: prefix.into(),
            source: source.into(),
        }
    }

    /// Creates a retrieval error.
    pub fn retrieval(
        bucket: impl Into<String>,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Retrieval {
            bucket: bucket.into(),
            key: key.into(),
            source: source.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for failures of the remote listing API.
    #[must_use]
    pub fn is_listing(&self) -> bool {
        matches!(self, Self::Listing { .. })
    }
}

//! Object storage access: paginated listings and whole-object retrieval.
//!
//! # Architecture
//!
//! - [`ObjectStore`] - Async trait over a bucket-scoped listing/retrieval API
//! - [`S3Store`] - Anonymous S3 implementation backed by `aws-sdk-s3`
//! - [`pages`] - Lazy page stream over one listing, following continuation tokens
//!
//! # Example
//!
//! ```no_run
//! use cruise_lug::store::{ListRequest, S3Store, pages};
//! use cruise_lug::StoreConfig;
//! use futures_util::TryStreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = S3Store::connect(&StoreConfig::default()).await?;
//! let mut listing = std::pin::pin!(pages(&store, ListRequest::children("mb/", "/")));
//! while let Some(page) = listing.try_next().await? {
//!     for prefix in &page.common_prefixes {
//!         println!("{prefix}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod s3;

pub use error::{BoxError, StoreError};
pub use s3::S3Store;

use std::path::Path;

use async_trait::async_trait;
use futures_util::Stream;
use futures_util::stream;

/// Delimiter separating levels of the key namespace.
pub const DELIMITER: &str = "/";

/// Parameters of one listing: the same request is re-sent for every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Key prefix to list under.
    pub prefix: String,
    /// Groups keys below the next delimiter into common prefixes when set.
    pub delimiter: Option<String>,
    /// Upper bound on entries per page; the store default applies when unset.
    pub max_keys: Option<i32>,
}

impl ListRequest {
    /// Lists the direct children (common prefixes and objects) of `prefix`.
    #[must_use]
    pub fn children(prefix: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: Some(delimiter.into()),
            max_keys: None,
        }
    }

    /// Lists every object below `prefix`, however deeply nested.
    #[must_use]
    pub fn flat(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: None,
            max_keys: None,
        }
    }

    /// Bounds the number of entries returned per page.
    #[must_use]
    pub fn with_max_keys(mut self, max_keys: i32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }
}

/// A single object from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key.
    pub key: String,
    /// Size in bytes as reported by the store.
    pub size: i64,
}

impl ObjectSummary {
    /// Creates a summary for `key` with `size` bytes.
    #[must_use]
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }

    /// Zero-length keys ending in the delimiter are folder placeholders, not data.
    #[must_use]
    pub fn is_directory_marker(&self) -> bool {
        self.key.ends_with(DELIMITER)
    }
}

/// One bounded chunk of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Direct child namespace nodes, each ending in the delimiter.
    pub common_prefixes: Vec<String>,
    /// Objects on this page.
    pub objects: Vec<ObjectSummary>,
    /// Token for the following page; `None` on the last page.
    pub next_token: Option<String>,
}

/// Bucket-scoped listing and retrieval.
///
/// Implementations are shared read-only between concurrent retrieval tasks,
/// so they must be `Send + Sync`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store reads from.
    fn bucket(&self) -> &str;

    /// Fetches a single listing page, starting after `continuation` when given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Listing`] when the listing call fails.
    async fn list_page(
        &self,
        request: &ListRequest,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Streams the object at `key` into `destination`, creating or truncating it.
    ///
    /// The parent directory must already exist. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Retrieval`] on transport failures and
    /// [`StoreError::Io`] when the local file cannot be written.
    async fn fetch_to_file(&self, key: &str, destination: &Path) -> Result<u64, StoreError>;
}

enum Cursor {
    Start,
    After(String),
    Exhausted,
}

/// Returns the pages of one listing as a lazy stream.
///
/// Each call starts a fresh listing; nothing is fetched until the stream is
/// polled. The stream ends after the first page without a continuation token
/// and yields at most one error.
pub fn pages<'a, S>(
    store: &'a S,
    request: ListRequest,
) -> impl Stream<Item = Result<ListPage, StoreError>> + Send + 'a
where
    S: ObjectStore + ?Sized,
{
    stream::try_unfold(Cursor::Start, move |cursor| {
        let request = request.clone();
        async move {
            let token = match cursor {
                Cursor::Exhausted => return Ok(None),
                Cursor::Start => None,
                Cursor::After(token) => Some(token),
            };
            let mut page = store.list_page(&request, token.as_deref()).await?;
            let next = match page.next_token.take() {
                Some(token) => Cursor::After(token),
                None => Cursor::Exhausted,
            };
            Ok(Some((page, next)))
        }
    })
}

/// Returns the last segment of `prefix` with trailing delimiters removed.
///
/// `mb/ship/platform/survey_a/` yields `survey_a`.
#[must_use]
pub fn base_name<'a>(prefix: &'a str, delimiter: &str) -> &'a str {
    let trimmed = prefix.trim_end_matches(delimiter);
    match trimmed.rfind(delimiter) {
        Some(index) => &trimmed[index + delimiter.len()..],
        None => trimmed,
    }
}

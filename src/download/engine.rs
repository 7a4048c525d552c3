//! Batch downloader for survey prefixes.
//!
//! Objects are retrieved page by page: every object on a listing page gets
//! its own Tokio task, and the next page is only requested once the whole
//! page has finished.
//!
//! # Concurrency Model
//!
//! - Prefixes are processed strictly one after another
//! - Within a prefix, pages are processed in listing order
//! - At most `page_size` retrievals are in flight at once
//! - A failed retrieval does not cancel its siblings; the first failure is
//!   returned after the page joins and stops the batch
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use cruise_lug::download::BatchDownloader;
//! use cruise_lug::store::S3Store;
//! use cruise_lug::StoreConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(S3Store::connect(&StoreConfig::default()).await?);
//! let downloader = BatchDownloader::new(store, 10)?;
//! downloader
//!     .download_prefixes(&["mb/ship/okeanos/EX1811/".to_string()], Path::new("./data"))
//!     .await?;
//! println!("{} objects", downloader.stats().completed());
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use futures_util::TryStreamExt;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::DownloadError;
use crate::config::{ConfigError, validate_page_size};
use crate::store::{DELIMITER, ListRequest, ObjectStore, ObjectSummary, StoreError, pages};

/// Progress counters for a download run.
///
/// Shared between retrieval tasks and any progress display, so all counters
/// are atomics.
#[derive(Debug, Default)]
pub struct DownloadStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
    bytes: AtomicU64,
}

impl DownloadStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects written successfully.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Objects whose retrieval failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Bytes written so far.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }

    fn record_completed(&self, bytes: u64) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.bytes.fetch_add(bytes, Ordering::SeqCst);
    }

    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Downloads every object below a set of prefixes into a local tree.
#[derive(Clone)]
pub struct BatchDownloader {
    store: Arc<dyn ObjectStore>,
    page_size: i32,
    stats: Arc<DownloadStats>,
}

impl BatchDownloader {
    /// Creates a downloader fetching `page_size` objects at a time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPageSize`] outside `1..=1000`.
    pub fn new(store: Arc<dyn ObjectStore>, page_size: i32) -> Result<Self, ConfigError> {
        let page_size = validate_page_size(page_size)?;
        debug!(page_size, bucket = store.bucket(), "creating batch downloader");
        Ok(Self {
            store,
            page_size,
            stats: Arc::new(DownloadStats::new()),
        })
    }

    /// Reports progress into `stats` instead of a private tracker.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<DownloadStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Configured objects per page.
    #[must_use]
    pub fn page_size(&self) -> i32 {
        self.page_size
    }

    /// Progress counters of this downloader.
    #[must_use]
    pub fn stats(&self) -> &Arc<DownloadStats> {
        &self.stats
    }

    /// Downloads all objects below each prefix, in order, into `root`.
    ///
    /// Each object lands at `root/<key>`; existing files are overwritten.
    ///
    /// # Errors
    ///
    /// Returns the first listing or retrieval failure. Files written before
    /// the failure are left in place.
    #[instrument(skip(self, prefixes), fields(prefixes = prefixes.len(), root = %root.display()))]
    pub async fn download_prefixes(
        &self,
        prefixes: &[String],
        root: &Path,
    ) -> Result<(), DownloadError> {
        for prefix in prefixes {
            self.download_prefix(prefix, root).await?;
        }

        info!(
            completed = self.stats.completed(),
            bytes = self.stats.bytes(),
            "batch download complete"
        );
        Ok(())
    }

    async fn download_prefix(&self, prefix: &str, root: &Path) -> Result<(), DownloadError> {
        info!(prefix, "downloading survey files");

        let request = ListRequest::flat(prefix).with_max_keys(self.page_size);
        let mut listing = std::pin::pin!(pages(self.store.as_ref(), request));

        while let Some(page) = listing.try_next().await? {
            self.download_page(page.objects, root).await?;
        }
        Ok(())
    }

    /// Spawns one task per object and waits for all of them.
    async fn download_page(
        &self,
        objects: Vec<ObjectSummary>,
        root: &Path,
    ) -> Result<(), DownloadError> {
        let mut tasks = JoinSet::new();

        for object in objects {
            let store = Arc::clone(&self.store);
            let stats = Arc::clone(&self.stats);
            let root = root.to_path_buf();

            tasks.spawn(async move {
                match retrieve_object(store.as_ref(), &object, &root).await {
                    Ok(bytes) => {
                        stats.record_completed(bytes);
                        Ok(())
                    }
                    Err(e) => {
                        warn!(key = %object.key, error = %e, "retrieval failed");
                        stats.record_failed();
                        Err(e)
                    }
                }
            });
        }

        debug!(task_count = tasks.len(), "waiting for page retrievals");

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(DownloadError::from).and_then(|r| r);
            if let Err(e) = result
                && first_error.is_none()
            {
                first_error = Some(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Fetches one object to its mirrored location below `root`.
///
/// Directory markers only create the directory. Returns bytes written.
async fn retrieve_object(
    store: &dyn ObjectStore,
    object: &ObjectSummary,
    root: &Path,
) -> Result<u64, DownloadError> {
    let destination = local_path(root, &object.key)?;

    if object.is_directory_marker() {
        tokio::fs::create_dir_all(&destination)
            .await
            .map_err(|e| StoreError::io(&destination, e))?;
        return Ok(0);
    }

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let written = store.fetch_to_file(&object.key, &destination).await?;
    debug!(key = %object.key, bytes = written, "object downloaded");
    Ok(written)
}

/// Maps an object key onto a path below `root`, one component per key segment.
///
/// # Errors
///
/// Returns [`DownloadError::UnsafeKey`] for keys that are empty, absolute,
/// contain empty inner segments, or contain `.`/`..` segments.
pub fn local_path(root: &Path, key: &str) -> Result<PathBuf, DownloadError> {
    let relative = key.strip_suffix(DELIMITER).unwrap_or(key);
    if relative.is_empty() {
        return Err(DownloadError::unsafe_key(key));
    }

    let mut path = root.to_path_buf();
    for segment in relative.split(DELIMITER) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => path.push(part),
            _ => return Err(DownloadError::unsafe_key(key)),
        }
    }
    Ok(path)
}

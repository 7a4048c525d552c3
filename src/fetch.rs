//! End-to-end survey retrieval: resolve, preflight, download.
//!
//! [`Fetcher::run`] validates the target before touching the network, then
//! for each requested data category resolves the surveys, checks that the
//! transfer fits on the target file system, and downloads it. Callers that
//! report progress register a callback with [`Fetcher::on_event`]; it sees
//! each stage before the next one starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::capacity::{CapacityReport, DiskSpace, SizeEstimate, estimate_transfer_size};
use crate::config::{ConfigError, DEFAULT_PAGE_SIZE, validate_page_size};
use crate::download::{BatchDownloader, DownloadError, DownloadStats};
use crate::store::{ObjectStore, StoreError};
use crate::survey::{DataType, Resolution, SurveyRequest, SurveyResolver};
use crate::target::{TargetError, verify_target};

/// Reasons a fetch is abandoned.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The target directory is unusable.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// A listing failed during resolution or estimation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Free space at the target could not be determined.
    #[error("could not determine free space at {}: {source}", path.display())]
    DiskQuery {
        /// The queried path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The transfer does not fit on the target file system.
    #[error(
        "not enough disk space: download needs {required_bytes} bytes but only {available_bytes} are available"
    )]
    InsufficientSpace {
        /// Estimated transfer size.
        required_bytes: u64,
        /// Free space at the target.
        available_bytes: u64,
    },

    /// The download itself failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Invalid store or download settings.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    /// Surveys to resolve.
    pub surveys: SurveyRequest,
    /// Categories to fetch, in order.
    pub data_types: Vec<DataType>,
    /// Existing directory receiving the mirrored tree.
    pub target: PathBuf,
}

/// Result of a completed download for one category.
#[derive(Debug, Clone)]
pub struct DownloadSummary {
    /// Surveys found and missed.
    pub resolution: Resolution,
    /// Per-survey sizes from the preflight pass.
    pub estimate: SizeEstimate,
    /// Preflight comparison.
    pub capacity: CapacityReport,
    /// Objects written.
    pub objects: usize,
    /// Bytes written.
    pub bytes: u64,
    /// Wall-clock time from resolution to the end of the download.
    pub elapsed: Duration,
}

/// Per-category result of a fetch.
#[derive(Debug, Clone)]
pub enum CategoryOutcome {
    /// Retrieval is not available for this category yet.
    Unsupported,
    /// None of the requested surveys exist in this category.
    NoSurveysFound,
    /// Surveys were downloaded.
    Downloaded(DownloadSummary),
}

/// Results of [`Fetcher::run`], in plan order.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Outcome per requested category.
    pub outcomes: Vec<(DataType, CategoryOutcome)>,
}

impl FetchReport {
    /// True if some category downloaded only part of the requested surveys.
    #[must_use]
    pub fn has_missing_surveys(&self) -> bool {
        self.outcomes.iter().any(|(_, outcome)| {
            matches!(outcome, CategoryOutcome::Downloaded(summary) if !summary.resolution.is_complete())
        })
    }
}

/// Stage reached by [`Fetcher::run`] for one category.
#[derive(Debug, Clone, Copy)]
pub enum FetchEvent<'a> {
    /// The category has no retrieval support and was skipped.
    Skipped {
        /// Skipped category.
        data_type: DataType,
    },
    /// Resolution finished; emitted even when nothing matched.
    Resolved {
        /// Resolved category.
        data_type: DataType,
        /// Surveys found and missed.
        resolution: &'a Resolution,
        /// Number of distinct names requested.
        wanted: usize,
    },
    /// Transfer size and free space are known; emitted before the
    /// comparison can abort the fetch.
    CapacityChecked {
        /// Category being fetched.
        data_type: DataType,
        /// Required and available bytes.
        capacity: &'a CapacityReport,
    },
    /// The category finished downloading.
    Downloaded {
        /// Downloaded category.
        data_type: DataType,
        /// Download results.
        summary: &'a DownloadSummary,
    },
}

/// Callback receiving [`FetchEvent`]s.
pub type FetchEventCallback = Arc<dyn Fn(FetchEvent<'_>) + Send + Sync>;

/// Runs fetch plans against one store.
#[derive(Clone)]
pub struct Fetcher {
    store: Arc<dyn ObjectStore>,
    disk: Arc<dyn DiskSpace>,
    page_size: i32,
    stats: Arc<DownloadStats>,
    on_event: Option<FetchEventCallback>,
}

impl Fetcher {
    /// Creates a fetcher with the default download page size.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, disk: Arc<dyn DiskSpace>) -> Self {
        Self {
            store,
            disk,
            page_size: DEFAULT_PAGE_SIZE,
            stats: Arc::new(DownloadStats::new()),
            on_event: None,
        }
    }

    /// Sets the number of objects fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPageSize`] outside `1..=1000`.
    pub fn with_page_size(mut self, page_size: i32) -> Result<Self, ConfigError> {
        self.page_size = validate_page_size(page_size)?;
        Ok(self)
    }

    /// Reports download progress into `stats`.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<DownloadStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Calls `callback` as each stage of a category completes.
    #[must_use]
    pub fn on_event(mut self, callback: FetchEventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    fn emit(&self, event: FetchEvent<'_>) {
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }

    /// Executes `plan`.
    ///
    /// The target is validated before any request is made. Categories without
    /// retrieval support are reported as [`CategoryOutcome::Unsupported`].
    ///
    /// # Errors
    ///
    /// Returns the first [`FetchError`]; later categories are not attempted.
    #[instrument(skip(self, plan), fields(target = %plan.target.display(), surveys = plan.surveys.len()))]
    pub async fn run(&self, plan: &FetchPlan) -> Result<FetchReport, FetchError> {
        verify_target(&plan.target)?;

        let mut report = FetchReport::default();
        for &data_type in &plan.data_types {
            let outcome = match data_type.namespace_root() {
                Some(root) => self.fetch_category(data_type, root, plan).await?,
                None => {
                    warn!(%data_type, "retrieval not available yet; skipping");
                    self.emit(FetchEvent::Skipped { data_type });
                    CategoryOutcome::Unsupported
                }
            };
            report.outcomes.push((data_type, outcome));
        }
        Ok(report)
    }

    async fn fetch_category(
        &self,
        data_type: DataType,
        root: &str,
        plan: &FetchPlan,
    ) -> Result<CategoryOutcome, FetchError> {
        let started = Instant::now();

        info!(%data_type, surveys = ?plan.surveys.names(), "resolving surveys");
        let resolution = SurveyResolver::new(self.store.as_ref())
            .resolve(root, &plan.surveys)
            .await?;
        self.emit(FetchEvent::Resolved {
            data_type,
            resolution: &resolution,
            wanted: plan.surveys.len(),
        });

        if resolution.is_empty() {
            info!(%data_type, "no surveys found");
            return Ok(CategoryOutcome::NoSurveysFound);
        }
        info!(
            found = resolution.matched.len(),
            wanted = plan.surveys.len(),
            prefixes = ?resolution.prefixes(),
            "resolved surveys"
        );

        let prefixes = resolution.prefixes();
        let (estimate, capacity) = self.measure(&prefixes, &plan.target).await?;
        self.emit(FetchEvent::CapacityChecked {
            data_type,
            capacity: &capacity,
        });
        ensure_fits(&capacity)?;

        let downloader = BatchDownloader::new(Arc::clone(&self.store), self.page_size)?
            .with_stats(Arc::clone(&self.stats));

        let objects_before = self.stats.completed();
        let bytes_before = self.stats.bytes();
        info!(target = %plan.target.display(), "downloading survey files");
        downloader.download_prefixes(&prefixes, &plan.target).await?;

        let summary = DownloadSummary {
            resolution,
            estimate,
            capacity,
            objects: self.stats.completed() - objects_before,
            bytes: self.stats.bytes() - bytes_before,
            elapsed: started.elapsed(),
        };
        self.emit(FetchEvent::Downloaded {
            data_type,
            summary: &summary,
        });
        Ok(CategoryOutcome::Downloaded(summary))
    }

    /// Estimates the transfer for `prefixes` and compares it with free space
    /// at `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Store`] if estimation fails,
    /// [`FetchError::DiskQuery`] if free space is unknown and
    /// [`FetchError::InsufficientSpace`] if the transfer does not fit.
    pub async fn check_capacity(
        &self,
        prefixes: &[String],
        target: &Path,
    ) -> Result<(SizeEstimate, CapacityReport), FetchError> {
        let (estimate, capacity) = self.measure(prefixes, target).await?;
        ensure_fits(&capacity)?;
        Ok((estimate, capacity))
    }

    async fn measure(
        &self,
        prefixes: &[String],
        target: &Path,
    ) -> Result<(SizeEstimate, CapacityReport), FetchError> {
        info!("checking available disk space");
        let estimate = estimate_transfer_size(self.store.as_ref(), prefixes).await?;
        let available_bytes =
            self.disk
                .available_bytes(target)
                .map_err(|source| FetchError::DiskQuery {
                    path: target.to_path_buf(),
                    source,
                })?;

        let capacity = CapacityReport {
            required_bytes: estimate.total_bytes(),
            available_bytes,
        };
        info!(
            required_bytes = capacity.required_bytes,
            available_bytes = capacity.available_bytes,
            "preflight size check"
        );
        Ok((estimate, capacity))
    }
}

fn ensure_fits(capacity: &CapacityReport) -> Result<(), FetchError> {
    if capacity.fits() {
        Ok(())
    } else {
        Err(FetchError::InsufficientSpace {
            required_bytes: capacity.required_bytes,
            available_bytes: capacity.available_bytes,
        })
    }
}

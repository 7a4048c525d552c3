//! Cruise Lug Core Library
//!
//! Resolves bathymetry survey names into key prefixes of the public NOAA DCDB
//! bucket, checks that the transfer fits on the local disk, and mirrors every
//! object below the matched prefixes into a local directory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`store`] - Object storage abstraction, paginated listings and the S3 adapter
//! - [`survey`] - Survey requests, data categories and prefix resolution
//! - [`capacity`] - Transfer size estimation and local free space
//! - [`download`] - Page-bounded concurrent retrieval
//! - [`target`] - Download directory validation
//! - [`fetch`] - End-to-end orchestration of the above

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capacity;
pub mod config;
pub mod download;
pub mod fetch;
pub mod store;
pub mod survey;
pub mod target;

// Re-export commonly used types
pub use capacity::{
    BYTES_PER_GB, CapacityReport, DiskSpace, PrefixUsage, SizeEstimate, SystemDiskSpace,
    bytes_to_gb, estimate_transfer_size,
};
pub use config::{ConfigError, DEFAULT_PAGE_SIZE, StoreConfig};
pub use download::{BatchDownloader, DownloadError, DownloadStats};
pub use fetch::{
    CategoryOutcome, DownloadSummary, FetchError, FetchEvent, FetchEventCallback, FetchPlan,
    FetchReport, Fetcher,
};
pub use store::{ListPage, ListRequest, ObjectStore, ObjectSummary, S3Store, StoreError};
pub use survey::{DataType, RequestError, Resolution, SurveyRequest, SurveyResolver};
pub use target::{TargetError, verify_target};

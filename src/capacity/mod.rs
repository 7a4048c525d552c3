//! Preflight size accounting for a set of survey prefixes.
//!
//! [`estimate_transfer_size`] walks the full flat listing of every prefix
//! (no early exit) and [`CapacityReport`] compares the total with the free
//! space reported by a [`DiskSpace`] source.

mod disk;

pub use disk::{DiskSpace, SystemDiskSpace, available_space};

use futures_util::TryStreamExt;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::store::{ListRequest, ObjectStore, StoreError, pages};

/// Bytes per gigabyte for reporting (decimal).
pub const BYTES_PER_GB: u64 = 1_000_000_000;

/// Object count and byte total below one prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixUsage {
    /// The listed prefix.
    pub prefix: String,
    /// Number of objects below it.
    pub objects: u64,
    /// Sum of object sizes as reported by the store.
    pub bytes: i64,
}

impl PrefixUsage {
    /// [`PrefixUsage::bytes`] for display, with a negative sum shown as zero.
    #[must_use]
    pub fn display_bytes(&self) -> u64 {
        u64::try_from(self.bytes).unwrap_or(0)
    }
}

/// Sizes of every prefix in an estimate, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    /// Per-prefix figures.
    pub prefixes: Vec<PrefixUsage>,
}

impl SizeEstimate {
    /// Total bytes across all prefixes.
    ///
    /// Sizes come from the store verbatim; a negative total is a store
    /// defect and is reported as zero.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        let total = self
            .prefixes
            .iter()
            .fold(0i64, |total, usage| total.saturating_add(usage.bytes));
        u64::try_from(total).unwrap_or(0)
    }

    /// Total objects across all prefixes.
    #[must_use]
    pub fn total_objects(&self) -> u64 {
        self.prefixes.iter().map(|usage| usage.objects).sum()
    }
}

/// Transfer size set against local free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    /// Bytes the transfer needs.
    pub required_bytes: u64,
    /// Bytes free at the target.
    pub available_bytes: u64,
}

impl CapacityReport {
    /// True when the target has strictly more free space than required.
    #[must_use]
    pub fn fits(&self) -> bool {
        self.available_bytes > self.required_bytes
    }
}

/// Sums object sizes below every prefix.
///
/// Each prefix is listed flat (no delimiter) until exhausted. An empty
/// `prefixes` slice yields an empty estimate without contacting the store.
///
/// # Errors
///
/// Returns the first [`StoreError`] from any listing page; the estimate is
/// abandoned.
#[instrument(skip(store, prefixes), fields(bucket = store.bucket(), prefixes = prefixes.len()))]
pub async fn estimate_transfer_size(
    store: &dyn ObjectStore,
    prefixes: &[String],
) -> Result<SizeEstimate, StoreError> {
    let mut estimate = SizeEstimate::default();

    for prefix in prefixes {
        let mut objects = 0u64;
        let mut bytes = 0i64;

        let mut listing = std::pin::pin!(pages(store, ListRequest::flat(prefix.as_str())));
        while let Some(page) = listing.try_next().await? {
            for object in &page.objects {
                objects += 1;
                bytes = bytes.saturating_add(object.size);
            }
        }

        debug!(prefix = %prefix, objects, bytes, "prefix size");
        estimate.prefixes.push(PrefixUsage {
            prefix: prefix.clone(),
            objects,
            bytes,
        });
    }

    Ok(estimate)
}

/// Converts bytes to gigabytes, truncated to two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bytes_to_gb(bytes: u64) -> f64 {
    let gb = bytes as f64 / BYTES_PER_GB as f64;
    (gb * 100.0).trunc() / 100.0
}

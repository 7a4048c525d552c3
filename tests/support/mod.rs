//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cruise_lug::{DiskSpace, ListPage, ListRequest, ObjectStore, ObjectSummary, StoreError};

/// Default page size of the S3 listing API.
const DEFAULT_MAX_KEYS: usize = 1000;

/// One recorded `list_page` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub prefix: String,
    pub delimiter: Option<String>,
    pub continuation: Option<String>,
}

enum Entry {
    Prefix(String),
    Object(ObjectSummary),
}

/// In-memory bucket with S3 listing semantics.
///
/// Keys are listed in lexicographic order. With a delimiter, keys below the
/// next delimiter collapse into common prefixes. Pages hold at most
/// `max_keys` entries (objects and common prefixes combined) and continue
/// through opaque index tokens.
pub struct MemoryStore {
    bucket: String,
    objects: BTreeMap<String, Vec<u8>>,
    failing_keys: HashSet<String>,
    failing_list_prefixes: HashSet<String>,
    fetch_delay: Duration,
    calls: Mutex<Vec<ListCall>>,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            bucket: "test-bucket".to_string(),
            objects: BTreeMap::new(),
            failing_keys: HashSet::new(),
            failing_list_prefixes: HashSet::new(),
            fetch_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Adds an object with the given contents.
    pub fn with_object(mut self, key: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(key.to_string(), contents.into());
        self
    }

    /// Adds an object of `size` bytes with deterministic contents.
    pub fn with_sized_object(self, key: &str, size: usize) -> Self {
        let contents: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        self.with_object(key, contents)
    }

    /// Makes retrieval of `key` fail.
    pub fn failing_on(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    /// Makes listing below exactly `prefix` fail.
    pub fn failing_list_on(mut self, prefix: &str) -> Self {
        self.failing_list_prefixes.insert(prefix.to_string());
        self
    }

    /// Holds every retrieval open for `delay` so overlap is observable.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Prefixes listed with a delimiter, in call order.
    pub fn listed_prefixes(&self) -> Vec<String> {
        self.list_calls()
            .into_iter()
            .filter(|call| call.delimiter.is_some())
            .map(|call| call.prefix)
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn entries(&self, request: &ListRequest) -> Vec<Entry> {
        let mut entries = Vec::new();
        let mut seen_prefixes = HashSet::new();

        for (key, contents) in self.objects.range(request.prefix.clone()..) {
            let Some(rest) = key.strip_prefix(request.prefix.as_str()) else {
                break;
            };
            let grouped = request
                .delimiter
                .as_deref()
                .and_then(|delimiter| rest.find(delimiter).map(|i| i + delimiter.len()));
            match grouped {
                Some(end) => {
                    let common = format!("{}{}", request.prefix, &rest[..end]);
                    if seen_prefixes.insert(common.clone()) {
                        entries.push(Entry::Prefix(common));
                    }
                }
                None => entries.push(Entry::Object(ObjectSummary::new(
                    key.clone(),
                    contents.len() as i64,
                ))),
            }
        }
        entries
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_page(
        &self,
        request: &ListRequest,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        self.calls.lock().unwrap().push(ListCall {
            prefix: request.prefix.clone(),
            delimiter: request.delimiter.clone(),
            continuation: continuation.map(str::to_string),
        });

        if self.failing_list_prefixes.contains(&request.prefix) {
            return Err(StoreError::listing(
                &self.bucket,
                &request.prefix,
                "AccessDenied",
            ));
        }

        let start = match continuation {
            Some(token) => token.parse::<usize>().map_err(|e| {
                StoreError::listing(&self.bucket, &request.prefix, e.to_string())
            })?,
            None => 0,
        };
        let page_size = request
            .max_keys
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_MAX_KEYS);

        let entries = self.entries(request);
        let total = entries.len();
        let end = (start + page_size).min(total);
        let mut page = ListPage::default();
        for entry in entries.into_iter().skip(start).take(end.saturating_sub(start)) {
            match entry {
                Entry::Prefix(prefix) => page.common_prefixes.push(prefix),
                Entry::Object(object) => page.objects.push(object),
            }
        }
        if end < total {
            page.next_token = Some(end.to_string());
        }
        Ok(page)
    }

    async fn fetch_to_file(&self, key: &str, destination: &Path) -> Result<u64, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        if self.failing_keys.contains(key) {
            return Err(StoreError::retrieval(&self.bucket, key, "connection reset"));
        }
        let Some(contents) = self.objects.get(key) else {
            return Err(StoreError::retrieval(&self.bucket, key, "NoSuchKey"));
        };

        tokio::fs::write(destination, contents)
            .await
            .map_err(|e| StoreError::io(destination, e))?;
        Ok(contents.len() as u64)
    }
}

/// Disk that always reports the same free space.
pub struct FixedDiskSpace(pub u64);

impl DiskSpace for FixedDiskSpace {
    fn available_bytes(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}

/// Disk whose free space cannot be determined.
pub struct FailingDiskSpace;

impl DiskSpace for FailingDiskSpace {
    fn available_bytes(&self, path: &Path) -> io::Result<u64> {
        Err(io::Error::other(format!(
            "statvfs failed for {}",
            path.display()
        )))
    }
}

/// Store with the namespace used across the resolver and fetch tests:
///
/// ```text
/// mb/shipA/platform1/{survey_a, survey_b}
/// mb/shipA/platform2/survey_c
/// mb/shipB/platform3/{survey_d, survey_a}
/// ```
pub fn survey_store() -> MemoryStore {
    MemoryStore::new()
        .with_sized_object("mb/shipA/platform1/survey_a/data.xyz", 1000)
        .with_sized_object("mb/shipA/platform1/survey_a/raw/line1.all", 300)
        .with_sized_object("mb/shipA/platform1/survey_b/data.xyz", 200)
        .with_sized_object("mb/shipA/platform2/survey_c/data.xyz", 50)
        .with_sized_object("mb/shipB/platform3/survey_a/other.xyz", 10)
        .with_sized_object("mb/shipB/platform3/survey_d/data.xyz", 75)
}

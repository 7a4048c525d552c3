//! Store and download settings with their defaults and valid ranges.

use thiserror::Error;

/// Public NOAA bucket holding DCDB bathymetry.
pub const DEFAULT_BUCKET: &str = "noaa-dcdb-bathymetry-pds";

/// Region of [`DEFAULT_BUCKET`].
pub const DEFAULT_REGION: &str = "us-east-1";

/// Objects fetched concurrently per listing page during a download.
pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Largest page the S3 listing API returns.
pub const MAX_PAGE_SIZE: i32 = 1000;

/// Attempts per storage request, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound for [`StoreConfig::max_attempts`].
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Invalid store or download settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Bucket name is empty.
    #[error("bucket name must not be empty")]
    EmptyBucket,

    /// Region is empty.
    #[error("region must not be empty")]
    EmptyRegion,

    /// Attempt budget outside `1..=MAX_ATTEMPTS_LIMIT`.
    #[error("invalid max attempts {value}: must be between 1 and {MAX_ATTEMPTS_LIMIT}")]
    InvalidMaxAttempts {
        /// The rejected value.
        value: u32,
    },

    /// Page size outside `1..=MAX_PAGE_SIZE`.
    #[error("invalid page size {value}: must be between 1 and {MAX_PAGE_SIZE}")]
    InvalidPageSize {
        /// The rejected value.
        value: i32,
    },
}

/// Where and how to reach the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bucket to read from.
    pub bucket: String,
    /// Region of the bucket.
    pub region: String,
    /// Alternative endpoint (S3-compatible servers, tests).
    pub endpoint_url: Option<String>,
    /// Attempts per request handed to the SDK's standard retry strategy.
    pub max_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl StoreConfig {
    /// Checks every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::EmptyBucket);
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::EmptyRegion);
        }
        if !(1..=MAX_ATTEMPTS_LIMIT).contains(&self.max_attempts) {
            return Err(ConfigError::InvalidMaxAttempts {
                value: self.max_attempts,
            });
        }
        Ok(())
    }
}

/// Checks a download page size.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPageSize`] outside `1..=MAX_PAGE_SIZE`.
pub fn validate_page_size(page_size: i32) -> Result<i32, ConfigError> {
    if (1..=MAX_PAGE_SIZE).contains(&page_size) {
        Ok(page_size)
    } else {
        Err(ConfigError::InvalidPageSize { value: page_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_config_is_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.bucket, "noaa-dcdb-bathymetry-pds");
        assert_eq!(config.region, "us-east-1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_config_rejects_empty_bucket() {
        let config = StoreConfig {
            bucket: "  ".to_string(),
            ..StoreConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyBucket));
    }

    #[test]
    fn test_store_config_rejects_attempts_out_of_range() {
        for value in [0, 11] {
            let config = StoreConfig {
                max_attempts: value,
                ..StoreConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidMaxAttempts { value })
            );
        }
    }

    #[test]
    fn test_validate_page_size_bounds() {
        assert_eq!(validate_page_size(1), Ok(1));
        assert_eq!(validate_page_size(1000), Ok(1000));
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(1001).is_err());
    }
}

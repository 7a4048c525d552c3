//! Configuration lifecycle: load file config and merge CLI overrides.
//!
//! Precedence per value: command-line flag, then config file, then built-in
//! default.

use anyhow::{Context, Result};
use cruise_lug::StoreConfig;
use cruise_lug::config::{DEFAULT_PAGE_SIZE, validate_page_size};

use crate::app_config::{FileConfig, LoadedConfig, VerbositySetting, load_default_file_config};
use crate::cli::GlobalArgs;

/// Where an effective value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueSource {
    CommandLine,
    ConfigFile,
    Default,
}

impl ValueSource {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::CommandLine => "command line",
            Self::ConfigFile => "config file",
            Self::Default => "default",
        }
    }
}

/// A value paired with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sourced<T> {
    pub(crate) value: T,
    pub(crate) source: ValueSource,
}

fn pick<T>(cli: Option<T>, file: Option<T>, default: impl FnOnce() -> T) -> Sourced<T> {
    match (cli, file) {
        (Some(value), _) => Sourced {
            value,
            source: ValueSource::CommandLine,
        },
        (None, Some(value)) => Sourced {
            value,
            source: ValueSource::ConfigFile,
        },
        (None, None) => Sourced {
            value: default(),
            source: ValueSource::Default,
        },
    }
}

/// Effective settings after merging CLI flags, file config and defaults.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) bucket: Sourced<String>,
    pub(crate) region: Sourced<String>,
    pub(crate) endpoint_url: Sourced<Option<String>>,
    pub(crate) page_size: Sourced<i32>,
    pub(crate) max_attempts: Sourced<u32>,
    pub(crate) verbosity: Sourced<VerbositySetting>,
}

impl ResolvedConfig {
    /// Store settings for [`cruise_lug::S3Store::connect`].
    pub(crate) fn store_config(&self) -> StoreConfig {
        StoreConfig {
            bucket: self.bucket.value.clone(),
            region: self.region.value.clone(),
            endpoint_url: self.endpoint_url.value.clone(),
            max_attempts: self.max_attempts.value,
        }
    }

    /// Default `tracing` level for the effective verbosity.
    pub(crate) fn default_log_level(&self) -> &'static str {
        match self.verbosity.value {
            VerbositySetting::Quiet => "error",
            VerbositySetting::Default => "info",
            VerbositySetting::Verbose => "debug",
            VerbositySetting::Debug => "trace",
        }
    }

    /// True when `-v`/`-q` were given; they then override `RUST_LOG`.
    pub(crate) fn force_cli_log_level(&self) -> bool {
        self.verbosity.source == ValueSource::CommandLine
    }
}

fn cli_verbosity(args: &GlobalArgs) -> Option<VerbositySetting> {
    if args.quiet {
        Some(VerbositySetting::Quiet)
    } else {
        match args.verbose {
            0 => None,
            1 => Some(VerbositySetting::Verbose),
            _ => Some(VerbositySetting::Debug),
        }
    }
}

/// Merges `args` over `file_config` over built-in defaults.
pub(crate) fn merge_config(args: &GlobalArgs, file_config: Option<&FileConfig>) -> Result<ResolvedConfig> {
    let file = file_config.cloned().unwrap_or_default();
    let defaults = StoreConfig::default();

    let resolved = ResolvedConfig {
        bucket: pick(args.bucket.clone(), file.bucket, || defaults.bucket.clone()),
        region: pick(args.region.clone(), file.region, || defaults.region.clone()),
        endpoint_url: pick(
            args.endpoint_url.clone().map(Some),
            file.endpoint_url.map(Some),
            || None,
        ),
        page_size: pick(args.page_size, file.page_size, || DEFAULT_PAGE_SIZE),
        max_attempts: pick(args.max_attempts, file.max_attempts, || {
            defaults.max_attempts
        }),
        verbosity: pick(cli_verbosity(args), file.verbosity, || {
            VerbositySetting::Default
        }),
    };

    resolved
        .store_config()
        .validate()
        .context("invalid effective store configuration")?;
    validate_page_size(resolved.page_size.value)
        .context("invalid effective page size")?;
    Ok(resolved)
}

/// Loads the default config file and merges CLI overrides.
pub(crate) fn resolve_config(args: &GlobalArgs) -> Result<(LoadedConfig, ResolvedConfig)> {
    let loaded = load_default_file_config()?;
    let resolved = merge_config(args, loaded.config.as_ref())?;
    Ok((loaded, resolved))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(argv: &[&str]) -> GlobalArgs {
        let mut full = vec!["clug"];
        full.extend_from_slice(argv);
        full.extend_from_slice(&["config", "show"]);
        Cli::try_parse_from(full).unwrap().global
    }

    #[test]
    fn test_merge_config_defaults_without_file() {
        let resolved = merge_config(&global(&[]), None).unwrap();
        assert_eq!(resolved.bucket.value, "noaa-dcdb-bathymetry-pds");
        assert_eq!(resolved.bucket.source, ValueSource::Default);
        assert_eq!(resolved.region.value, "us-east-1");
        assert_eq!(resolved.endpoint_url.value, None);
        assert_eq!(resolved.page_size.value, 10);
        assert_eq!(resolved.max_attempts.value, 3);
        assert_eq!(resolved.default_log_level(), "info");
        assert!(!resolved.force_cli_log_level());
    }

    #[test]
    fn test_merge_config_file_overrides_defaults() {
        let file = FileConfig {
            bucket: Some("mirror".to_string()),
            page_size: Some(50),
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };
        let resolved = merge_config(&global(&[]), Some(&file)).unwrap();
        assert_eq!(resolved.bucket.value, "mirror");
        assert_eq!(resolved.bucket.source, ValueSource::ConfigFile);
        assert_eq!(resolved.page_size.value, 50);
        assert_eq!(resolved.region.source, ValueSource::Default);
        assert_eq!(resolved.default_log_level(), "error");
        assert!(!resolved.force_cli_log_level());
    }

    #[test]
    fn test_merge_config_cli_overrides_file() {
        let file = FileConfig {
            bucket: Some("mirror".to_string()),
            page_size: Some(50),
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };
        let resolved = merge_config(
            &global(&["--bucket", "cli-bucket", "--page-size", "5", "-v"]),
            Some(&file),
        )
        .unwrap();
        assert_eq!(resolved.bucket.value, "cli-bucket");
        assert_eq!(resolved.bucket.source, ValueSource::CommandLine);
        assert_eq!(resolved.page_size.value, 5);
        assert_eq!(resolved.default_log_level(), "debug");
        assert!(resolved.force_cli_log_level());
    }

    #[test]
    fn test_merge_config_verbosity_levels() {
        let resolved = merge_config(&global(&["-vv"]), None).unwrap();
        assert_eq!(resolved.default_log_level(), "trace");

        let resolved = merge_config(&global(&["-q"]), None).unwrap();
        assert_eq!(resolved.default_log_level(), "error");
    }

    #[test]
    fn test_merge_config_endpoint_builds_store_config() {
        let resolved =
            merge_config(&global(&["--endpoint-url", "http://127.0.0.1:9000"]), None).unwrap();
        let store = resolved.store_config();
        assert_eq!(store.endpoint_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(store.bucket, "noaa-dcdb-bathymetry-pds");
    }

    #[test]
    fn test_merge_config_rejects_blank_cli_bucket() {
        let err = merge_config(&global(&["--bucket", " "]), None).unwrap_err();
        assert!(format!("{err:#}").contains("bucket"));
    }
}

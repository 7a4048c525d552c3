//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cruise_lug::config::{MAX_ATTEMPTS_LIMIT, MAX_PAGE_SIZE};

/// File configuration for clug defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Bucket to read survey data from.
    pub bucket: Option<String>,
    /// Region of the bucket.
    pub region: Option<String>,
    /// Alternative S3-compatible endpoint.
    pub endpoint_url: Option<String>,
    /// Files downloaded concurrently per listing page.
    pub page_size: Option<i32>,
    /// Attempts per storage request.
    pub max_attempts: Option<u32>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_non_empty("bucket", self.bucket.as_deref())?;
        validate_non_empty("region", self.region.as_deref())?;
        validate_non_empty("endpoint_url", self.endpoint_url.as_deref())?;

        if let Some(page_size) = self.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&page_size)
        {
            bail!(
                "Invalid config value for `page_size`: {page_size}. Expected range: 1..={MAX_PAGE_SIZE}"
            );
        }

        if let Some(max_attempts) = self.max_attempts
            && !(1..=MAX_ATTEMPTS_LIMIT).contains(&max_attempts)
        {
            bail!(
                "Invalid config value for `max_attempts`: {max_attempts}. Expected range: 1..={MAX_ATTEMPTS_LIMIT}"
            );
        }

        Ok(())
    }
}

fn validate_non_empty(field: &str, value: Option<&str>) -> Result<()> {
    if let Some(value) = value
        && value.trim().is_empty()
    {
        bail!("Invalid config value for `{field}`: must not be empty");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Indicates whether configuration was loaded from disk.
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/clug/config.toml`
/// 2. `$HOME/.config/clug/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("clug").join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("clug")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "bucket" => cfg.bucket = Some(parse_string_literal(value).with_context(invalid)?),
            "region" => cfg.region = Some(parse_string_literal(value).with_context(invalid)?),
            "endpoint_url" => {
                cfg.endpoint_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "page_size" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let n = i32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("page_size out of range for i32"))
                    .with_context(invalid)?;
                cfg.page_size = Some(n);
            }
            "max_attempts" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let n = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("max_attempts out of range for u32"))
                    .with_context(invalid)?;
                cfg.max_attempts = Some(n);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

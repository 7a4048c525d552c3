//! CLI output formatting and display helpers.
//!
//! Builders return lines so they can be tested; `print_*` wrappers write them
//! to stdout.

use std::path::Path;
use std::time::Duration;

use cruise_lug::{CapacityReport, DataType, DownloadSummary, FetchEvent, Resolution, bytes_to_gb};

/// Message when survey names or the target are missing.
pub const MISSING_ARGS_GUIDANCE: &str = "Please specify survey name(s) and a target file path.";

/// Message when no data type flag was given.
pub const MISSING_DATA_TYPE_GUIDANCE: &str = "Please specify data type(s) for download.";

/// Message when an inspection command got no survey names.
pub const MISSING_SURVEYS_GUIDANCE: &str = "Please specify survey name(s).";

/// Formats a byte count as decimal gigabytes truncated to two places.
pub fn format_gb(bytes: u64) -> String {
    format!("{}GB", bytes_to_gb(bytes))
}

/// Elapsed wall-clock time in hours.
pub fn hours(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() / 3600.0
}

/// Prints guidance followed by the command usage (the no-op path).
pub fn print_usage_guidance(message: &str, usage: &str) {
    println!("{message}");
    println!("{usage}");
}

/// Printed when the transfer does not fit on the target.
pub const INSUFFICIENT_SPACE: &str = "Specified path does not have enough disk space available.";

/// Lines comparing the transfer size with free space.
pub fn capacity_lines(capacity: &CapacityReport) -> Vec<String> {
    let mut lines = vec![
        format!("  total download size: {}", format_gb(capacity.required_bytes)),
        format!("  disk space available: {}", format_gb(capacity.available_bytes)),
    ];
    if !capacity.fits() {
        lines.push(INSUFFICIENT_SPACE.to_string());
    }
    lines
}

/// Lines reporting which surveys were found.
pub fn resolution_lines(resolution: &Resolution, wanted: usize) -> Vec<String> {
    if resolution.is_empty() {
        return vec!["No surveys found.".to_string()];
    }
    let mut lines = vec![format!(
        "Found {} of {} wanted surveys at: [{}]",
        resolution.matched.len(),
        wanted,
        resolution.prefixes().join(" ")
    )];
    if !resolution.is_complete() {
        lines.push(format!("Surveys not found: {}", resolution.missing.join(", ")));
    }
    lines
}

/// Lines closing a finished category download.
pub fn completion_lines(
    data_type: DataType,
    summary: &DownloadSummary,
    target: &Path,
) -> Vec<String> {
    vec![
        format!(
            "Downloaded {} files ({}) to {}.",
            summary.objects,
            format_gb(summary.bytes),
            target.display()
        ),
        format!("{} data downloaded.", data_type.label()),
        format!("Download completed in {:.4} hours.", hours(summary.elapsed)),
    ]
}

/// Lines for one fetch stage, written to `target`.
pub fn event_lines(event: &FetchEvent<'_>, target: &Path) -> Vec<String> {
    match *event {
        FetchEvent::Skipped { data_type } => vec![format!(
            "{} downloads are not supported yet; skipping.",
            data_type.label()
        )],
        FetchEvent::Resolved {
            resolution, wanted, ..
        } => resolution_lines(resolution, wanted),
        FetchEvent::CapacityChecked { capacity, .. } => capacity_lines(capacity),
        FetchEvent::Downloaded { data_type, summary } => {
            completion_lines(data_type, summary, target)
        }
    }
}

/// Prints one fetch stage as it happens.
pub fn print_event(event: &FetchEvent<'_>, target: &Path) {
    for line in event_lines(event, target) {
        println!("{line}");
    }
}

//! Exit code logic for the clug process.
//!
//! Single responsibility: map a fetch report to the process exit outcome.

use cruise_lug::FetchReport;

use crate::ProcessExit;

/// Determines the process exit outcome of a completed fetch.
///
/// Requested surveys that were not found in a downloaded category make the
/// run partial; nothing found at all is still a success.
pub(crate) fn determine_exit_outcome(report: &FetchReport) -> ProcessExit {
    if report.has_missing_surveys() {
        ProcessExit::Partial
    } else {
        ProcessExit::Success
    }
}

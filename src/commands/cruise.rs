//! `get cruise`: resolve, preflight, and download surveys.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cruise_lug::{
    DownloadStats, FetchEvent, FetchPlan, Fetcher, ObjectStore, S3Store, SurveyRequest,
    SystemDiskSpace, verify_target,
};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::app::config_manager::ResolvedConfig;
use crate::app::{exit_handler, progress_manager, terminal};
use crate::app_config::VerbositySetting;
use crate::cli::CruiseArgs;
use crate::commands::subcommand_usage;
use crate::output;

pub(crate) async fn run_get_cruise_command(
    args: &CruiseArgs,
    config: &ResolvedConfig,
) -> Result<ProcessExit> {
    let Some((surveys, target)) = args.surveys_and_target() else {
        output::print_usage_guidance(
            output::MISSING_ARGS_GUIDANCE,
            &subcommand_usage(&["get", "cruise"]),
        );
        return Ok(ProcessExit::Success);
    };

    let data_types = args.data_types.selected();
    if data_types.is_empty() {
        output::print_usage_guidance(
            output::MISSING_DATA_TYPE_GUIDANCE,
            &subcommand_usage(&["get", "cruise"]),
        );
        return Ok(ProcessExit::Success);
    }

    let request = SurveyRequest::new(surveys.iter().cloned())?;
    let target = PathBuf::from(target);

    // Fail on a bad target before building the client.
    verify_target(&target)?;

    let store = S3Store::connect(&config.store_config())
        .await
        .context("failed to configure storage client")?;
    info!(bucket = store.bucket(), "storage client ready");

    let stats = Arc::new(DownloadStats::new());
    let report_target = target.clone();
    let fetcher = Fetcher::new(Arc::new(store), Arc::new(SystemDiskSpace))
        .with_page_size(config.page_size.value)?
        .with_stats(Arc::clone(&stats))
        .on_event(Arc::new(move |event: FetchEvent<'_>| {
            output::print_event(&event, &report_target);
        }));

    let plan = FetchPlan {
        surveys: request,
        data_types,
        target,
    };
    debug!(?plan, "fetch plan");

    let use_spinner = terminal::should_use_spinner(
        std::io::stderr().is_terminal(),
        config.verbosity.value == VerbositySetting::Quiet,
        terminal::is_dumb_terminal(),
    );
    let (spinner, stop) = progress_manager::spawn_progress_ui(use_spinner, Arc::clone(&stats));
    let result = fetcher.run(&plan).await;
    progress_manager::stop_progress_ui(spinner, &stop).await;

    let report = result?;
    println!("Done.");

    Ok(exit_handler::determine_exit_outcome(&report))
}

//! `glance` and `list`: look at survey contents without downloading.

use anyhow::{Context, Result};
use cruise_lug::store::pages;
use cruise_lug::{
    DataType, ListRequest, ObjectStore, Resolution, S3Store, SurveyRequest, SurveyResolver,
    estimate_transfer_size,
};
use futures_util::TryStreamExt;
use serde::Serialize;
use tracing::warn;

use crate::ProcessExit;
use crate::app::config_manager::ResolvedConfig;
use crate::cli::InspectArgs;
use crate::commands::subcommand_usage;
use crate::output::{self, format_gb};

/// Size of one resolved survey.
#[derive(Debug, Serialize)]
struct SurveyUsage {
    name: String,
    prefix: String,
    objects: u64,
    bytes: u64,
}

/// Glance result for one data category.
#[derive(Debug, Serialize)]
struct GlanceEntry {
    data_type: DataType,
    supported: bool,
    surveys: Vec<SurveyUsage>,
    missing: Vec<String>,
    total_objects: u64,
    total_bytes: u64,
}

/// One object a download would write.
#[derive(Debug, Serialize)]
struct ListedObject {
    data_type: DataType,
    survey: String,
    key: String,
    size: i64,
}

/// Validated request and categories, or `None` after printing usage.
fn prepare(args: &InspectArgs, command: &str) -> Result<Option<(SurveyRequest, Vec<DataType>)>> {
    if args.surveys.is_empty() {
        output::print_usage_guidance(
            output::MISSING_SURVEYS_GUIDANCE,
            &subcommand_usage(&[command]),
        );
        return Ok(None);
    }

    let mut data_types = args.data_types.selected();
    if data_types.is_empty() {
        data_types.push(DataType::Multibeam);
    }
    let request = SurveyRequest::new(args.surveys.iter().cloned())?;
    Ok(Some((request, data_types)))
}

async fn connect(config: &ResolvedConfig) -> Result<S3Store> {
    S3Store::connect(&config.store_config())
        .await
        .context("failed to configure storage client")
}

/// Resolves `request` for `data_type`; `None` when the category has no namespace.
async fn resolve(
    store: &dyn ObjectStore,
    data_type: DataType,
    request: &SurveyRequest,
) -> Result<Option<Resolution>> {
    let Some(root) = data_type.namespace_root() else {
        warn!(%data_type, "lookups not available yet; skipping");
        return Ok(None);
    };
    let resolution = SurveyResolver::new(store).resolve(root, request).await?;
    Ok(Some(resolution))
}

fn exit_for(resolutions: &[Resolution]) -> ProcessExit {
    let partial = resolutions
        .iter()
        .any(|resolution| !resolution.is_empty() && !resolution.is_complete());
    if partial {
        ProcessExit::Partial
    } else {
        ProcessExit::Success
    }
}

pub(crate) async fn run_glance_command(
    args: &InspectArgs,
    config: &ResolvedConfig,
) -> Result<ProcessExit> {
    let Some((request, data_types)) = prepare(args, "glance")? else {
        return Ok(ProcessExit::Success);
    };
    let store = connect(config).await?;

    let mut entries = Vec::new();
    let mut resolutions = Vec::new();
    for data_type in data_types {
        let Some(resolution) = resolve(&store, data_type, &request).await? else {
            entries.push(GlanceEntry {
                data_type,
                supported: false,
                surveys: Vec::new(),
                missing: request.names().to_vec(),
                total_objects: 0,
                total_bytes: 0,
            });
            continue;
        };

        let estimate = estimate_transfer_size(&store, &resolution.prefixes()).await?;
        let surveys = resolution
            .matched
            .iter()
            .zip(&estimate.prefixes)
            .map(|(survey, usage)| SurveyUsage {
                name: survey.name.clone(),
                prefix: survey.prefix.clone(),
                objects: usage.objects,
                bytes: usage.display_bytes(),
            })
            .collect();
        entries.push(GlanceEntry {
            data_type,
            supported: true,
            surveys,
            missing: resolution.missing.clone(),
            total_objects: estimate.total_objects(),
            total_bytes: estimate.total_bytes(),
        });
        resolutions.push(resolution);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            for line in glance_lines(entry) {
                println!("{line}");
            }
        }
    }

    Ok(exit_for(&resolutions))
}

fn glance_lines(entry: &GlanceEntry) -> Vec<String> {
    let mut lines = vec![format!("{}:", entry.data_type.label())];
    if !entry.supported {
        lines.push("  not supported yet".to_string());
        return lines;
    }
    if entry.surveys.is_empty() {
        lines.push("  no surveys found".to_string());
        return lines;
    }
    for survey in &entry.surveys {
        lines.push(format!(
            "  {}  {}  {} files  {}",
            survey.name,
            survey.prefix,
            survey.objects,
            format_gb(survey.bytes)
        ));
    }
    if !entry.missing.is_empty() {
        lines.push(format!("  not found: {}", entry.missing.join(", ")));
    }
    lines.push(format!(
        "  total: {} files, {}",
        entry.total_objects,
        format_gb(entry.total_bytes)
    ));
    lines
}

pub(crate) async fn run_list_command(
    args: &InspectArgs,
    config: &ResolvedConfig,
) -> Result<ProcessExit> {
    let Some((request, data_types)) = prepare(args, "list")? else {
        return Ok(ProcessExit::Success);
    };
    let store = connect(config).await?;

    let mut listed = Vec::new();
    let mut resolutions = Vec::new();
    for data_type in data_types {
        let Some(resolution) = resolve(&store, data_type, &request).await? else {
            continue;
        };
        for survey in &resolution.matched {
            let mut listing =
                std::pin::pin!(pages(&store, ListRequest::flat(survey.prefix.as_str())));
            while let Some(page) = listing.try_next().await? {
                for object in page.objects {
                    if !args.json {
                        println!("{}\t{}", object.size, object.key);
                    }
                    listed.push(ListedObject {
                        data_type,
                        survey: survey.name.clone(),
                        key: object.key,
                        size: object.size,
                    });
                }
            }
        }
        if !resolution.is_complete() && !args.json {
            eprintln!("surveys not found: {}", resolution.missing.join(", "));
        }
        resolutions.push(resolution);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    }

    Ok(exit_for(&resolutions))
}

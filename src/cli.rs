//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

use cruise_lug::DataType;

/// Download NOAA marine geophysics survey data.
///
/// Resolves survey names against the NOAA Open Data Dissemination buckets,
/// checks that the data fits on the local disk, and mirrors every survey
/// file into a local directory.
#[derive(Parser, Debug)]
#[command(name = "clug")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Bucket to read survey data from
    #[arg(long, global = true, value_name = "NAME")]
    pub bucket: Option<String>,

    /// Region of the bucket
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// Alternative S3-compatible endpoint (uses path-style addressing)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Files downloaded concurrently per listing page (1-1000)
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(i32).range(1..=1000))]
    pub page_size: Option<i32>,

    /// Attempts per storage request, including the first (1-10)
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download data to a local path
    Get {
        #[command(subcommand)]
        command: GetCommand,
    },
    /// Show how much data the given surveys hold
    Glance(InspectArgs),
    /// List every file the given surveys hold
    List(InspectArgs),
    /// Inspect effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum GetCommand {
    /// Download NOAA survey data to a local path
    ///
    /// Use 'clug get cruise <survey(s)> <local path> <options>' to download
    /// marine geophysics data to your machine. You must specify at least one
    /// data type. The path must exist and be readable and writable.
    Cruise(CruiseArgs),
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print effective config values and their sources
    Show,
}

/// Data category selection shared by all survey commands.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DataTypeFlags {
    /// Multibeam bathymetry data
    #[arg(short = 'm', long = "multibeam-bathy")]
    pub multibeam: bool,

    /// Crowdsourced bathymetry data
    #[arg(short = 'c', long = "crowdsourced-bathy")]
    pub crowdsourced: bool,

    /// Water column data
    #[arg(short = 'w', long = "water-column")]
    pub water_column: bool,

    /// Trackline data
    #[arg(short = 't', long = "trackline")]
    pub trackline: bool,
}

impl DataTypeFlags {
    /// Selected categories in a fixed order.
    #[must_use]
    pub fn selected(&self) -> Vec<DataType> {
        [
            (self.multibeam, DataType::Multibeam),
            (self.crowdsourced, DataType::Crowdsourced),
            (self.water_column, DataType::WaterColumn),
            (self.trackline, DataType::Trackline),
        ]
        .into_iter()
        .filter_map(|(selected, data_type)| selected.then_some(data_type))
        .collect()
    }
}

/// Arguments for `get cruise`.
#[derive(Args, Debug, Clone)]
pub struct CruiseArgs {
    /// Survey names followed by the local target directory
    #[arg(value_name = "SURVEY... TARGET")]
    pub args: Vec<String>,

    #[command(flatten)]
    pub data_types: DataTypeFlags,
}

impl CruiseArgs {
    /// Splits the positionals into survey names and target; `None` with fewer than two.
    #[must_use]
    pub fn surveys_and_target(&self) -> Option<(&[String], &str)> {
        match self.args.split_last() {
            Some((target, surveys)) if !surveys.is_empty() => Some((surveys, target.as_str())),
            _ => None,
        }
    }
}

/// Arguments for `glance` and `list`.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Survey names to look up
    #[arg(value_name = "SURVEY")]
    pub surveys: Vec<String>,

    #[command(flatten)]
    pub data_types: DataTypeFlags,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

//! Top-level run: parse CLI, resolve config, set up logging, dispatch.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::app::{config_manager, terminal};
use crate::cli::{Cli, Command, ConfigCommand, GetCommand};
use crate::{ProcessExit, commands};

pub(crate) async fn run_clug() -> Result<ProcessExit> {
    let cli = Cli::parse();
    let (loaded, resolved) = config_manager::resolve_config(&cli.global)?;

    terminal::init_tracing(
        resolved.default_log_level(),
        resolved.force_cli_log_level(),
        terminal::is_no_color_requested(),
    );
    debug!(?cli, "CLI arguments parsed");

    match &cli.command {
        Command::Get {
            command: GetCommand::Cruise(args),
        } => commands::run_get_cruise_command(args, &resolved).await,
        Command::Glance(args) => commands::run_glance_command(args, &resolved).await,
        Command::List(args) => commands::run_list_command(args, &resolved).await,
        Command::Config {
            command: ConfigCommand::Show,
        } => {
            commands::run_config_show_command(&loaded, &resolved);
            Ok(ProcessExit::Success)
        }
    }
}

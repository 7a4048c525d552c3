//! CLI command handlers.

mod config;
mod cruise;
mod inspect;

use clap::CommandFactory;

use crate::cli::Cli;

pub(crate) use config::run_config_show_command;
pub(crate) use cruise::run_get_cruise_command;
pub(crate) use inspect::{run_glance_command, run_list_command};

/// Rendered usage of the subcommand at `path` (e.g. `["get", "cruise"]`).
pub(crate) fn subcommand_usage(path: &[&str]) -> String {
    let mut command = Cli::command();
    command.build();

    let mut current = Some(command);
    for name in path {
        current = current.and_then(|command| command.find_subcommand(name).cloned());
    }
    current
        .map(|mut command| command.render_usage().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::subcommand_usage;

    #[test]
    fn test_subcommand_usage_names_full_path() {
        let usage = subcommand_usage(&["get", "cruise"]);
        assert!(usage.contains("clug get cruise"), "usage was: {usage}");
    }

    #[test]
    fn test_subcommand_usage_unknown_is_empty() {
        assert!(subcommand_usage(&["nope"]).is_empty());
    }
}

//! Config command handlers: show effective configuration.

use std::fmt::Display;

use crate::app::config_manager::{ResolvedConfig, Sourced};
use crate::app_config::LoadedConfig;

fn line<T: Display>(key: &str, sourced: &Sourced<T>) -> String {
    format!("{key} = {} ({})", sourced.value, sourced.source.as_str())
}

pub(crate) fn config_show_lines(loaded: &LoadedConfig, resolved: &ResolvedConfig) -> Vec<String> {
    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    let endpoint = Sourced {
        value: resolved
            .endpoint_url
            .value
            .clone()
            .unwrap_or_else(|| "<aws default>".to_string()),
        source: resolved.endpoint_url.source,
    };
    let verbosity = Sourced {
        value: resolved.verbosity.value.as_str(),
        source: resolved.verbosity.source,
    };

    vec![
        format!("config_path = {resolved_path}"),
        format!(
            "config_file = {}",
            if loaded.loaded_from_file() {
                "loaded"
            } else {
                "not found (using defaults)"
            }
        ),
        line("bucket", &resolved.bucket),
        line("region", &resolved.region),
        line("endpoint_url", &endpoint),
        line("page_size", &resolved.page_size),
        line("max_attempts", &resolved.max_attempts),
        line("verbosity", &verbosity),
    ]
}

pub(crate) fn run_config_show_command(loaded: &LoadedConfig, resolved: &ResolvedConfig) {
    for line in config_show_lines(loaded, resolved) {
        println!("{line}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::config_manager::merge_config;
    use crate::app_config::FileConfig;
    use crate::cli::GlobalArgs;

    #[test]
    fn test_config_show_lines_with_sources() {
        let file = FileConfig {
            region: Some("eu-west-1".to_string()),
            ..FileConfig::default()
        };
        let args = GlobalArgs {
            page_size: Some(20),
            ..GlobalArgs::default()
        };
        let resolved = merge_config(&args, Some(&file)).unwrap();
        let loaded = LoadedConfig {
            path: Some(PathBuf::from("/home/u/.config/clug/config.toml")),
            config: Some(file),
        };

        let lines = config_show_lines(&loaded, &resolved);
        assert_eq!(lines[0], "config_path = /home/u/.config/clug/config.toml");
        assert_eq!(lines[1], "config_file = loaded");
        assert_eq!(lines[2], "bucket = noaa-dcdb-bathymetry-pds (default)");
        assert_eq!(lines[3], "region = eu-west-1 (config file)");
        assert_eq!(lines[4], "endpoint_url = <aws default> (default)");
        assert_eq!(lines[5], "page_size = 20 (command line)");
        assert_eq!(lines[6], "max_attempts = 3 (default)");
        assert_eq!(lines[7], "verbosity = default (default)");
    }

    #[test]
    fn test_config_show_lines_without_file() {
        let resolved = merge_config(&GlobalArgs::default(), None).unwrap();
        let loaded = LoadedConfig {
            path: None,
            config: None,
        };
        let lines = config_show_lines(&loaded, &resolved);
        assert_eq!(lines[0], "config_path = <unresolved>");
        assert_eq!(lines[1], "config_file = not found (using defaults)");
    }
}

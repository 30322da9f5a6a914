//! Configuration loading for the flowchart CLI.
//!
//! Without `--config` the built-in [`EditorConfig`] defaults apply. A
//! config file is TOML; any field it omits keeps its default.

use std::fs;
use std::path::Path;

use flow_core::EditorConfig;
use log::{debug, info};

use crate::error::CliError;

/// Load the editor configuration, from `path` when given.
///
/// # Errors
///
/// Returns [`CliError`] when the file cannot be read, is not valid TOML,
/// or holds out-of-range values.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, CliError> {
    let Some(path) = path else {
        debug!("no config file given, using defaults");
        return Ok(EditorConfig::default());
    };
    info!("loading config from {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate TOML configuration text.
pub fn parse_config(content: &str) -> Result<EditorConfig, CliError> {
    let config: EditorConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &EditorConfig) -> Result<(), CliError> {
    let positive = [
        ("grid_size", config.grid_size),
        ("min_node_width", config.min_node_width),
        ("min_node_height", config.min_node_height),
        ("min_zoom", config.min_zoom),
        ("max_zoom", config.max_zoom),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(CliError::Validation(format!("{name} must be positive, got {value}")));
        }
    }
    if config.min_zoom > config.max_zoom {
        return Err(CliError::Validation(format!(
            "min_zoom ({}) exceeds max_zoom ({})",
            config.min_zoom, config.max_zoom
        )));
    }
    if config.history_limit == 0 {
        return Err(CliError::Validation("history_limit must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), EditorConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = parse_config("grid_size = 20.0\nhistory_limit = 10\n").unwrap();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.min_node_width, EditorConfig::default().min_node_width);
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let err = parse_config("min_zoom = 3.0\nmax_zoom = 2.0\n").unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("min_zoom"));
    }

    #[test]
    fn rejects_non_positive_grid() {
        let err = parse_config("grid_size = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("grid_size"));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = parse_config("grid_size = \"big\"").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_config(Some(Path::new("/nonexistent/flowchart.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/flowchart.toml"));
    }
}

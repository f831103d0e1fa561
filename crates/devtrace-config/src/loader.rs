// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Values are layered in this order, later layers winning:
//! 1. TOML file
//! 2. Environment variables
//! 3. CLI arguments

use crate::{ConfigError, ConfigResult, DevtraceConfig, SinkKind};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "devtrace_configuration.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DEVTRACE_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `DEVTRACE_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML. Validation is a
/// separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<DevtraceConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: DevtraceConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `DEVTRACE_LOG_LEVEL` -> `system.log_level`
/// - `DEVTRACE_SINK` -> `sink.kind`
/// - `DEVTRACE_CONTEXT_NAME_PREFIX` -> `context.name_prefix`
/// - `DEVTRACE_ANNOUNCE_NAMES` -> `context.announce_names`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut DevtraceConfig) {
    if let Ok(value) = env::var("DEVTRACE_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("DEVTRACE_SINK") {
        if let Ok(kind) = value.parse::<SinkKind>() {
            config.sink.kind = kind;
        }
    }
    if let Ok(value) = env::var("DEVTRACE_CONTEXT_NAME_PREFIX") {
        config.context.name_prefix = value;
    }
    if let Ok(value) = env::var("DEVTRACE_ANNOUNCE_NAMES") {
        config.context.announce_names = parse_flag(&value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// Recognised keys: `log_level`, `debug`, `sink`, `name_prefix`, `announce_names`.
pub fn apply_cli_overrides(config: &mut DevtraceConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("debug") {
        config.system.debug = parse_flag(value);
    }
    if let Some(value) = cli_args.get("sink") {
        if let Ok(kind) = value.parse::<SinkKind>() {
            config.sink.kind = kind;
        }
    }
    if let Some(value) = cli_args.get("name_prefix") {
        config.context.name_prefix = value.clone();
    }
    if let Some(value) = cli_args.get("announce_names") {
        config.context.announce_names = parse_flag(value);
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every problem is collected before reporting, so one run surfaces all of them.

use crate::{ConfigError, ConfigResult, DevtraceConfig};

/// Accepted `system.log_level` values, case-insensitive
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Longest prefix that still leaves room for `" <u32 id>"` inside a 16-bit name length
pub const MAX_NAME_PREFIX_LEN: usize = u16::MAX as usize - 11;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &DevtraceConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_system(config, &mut errors);
    validate_context(config, &mut errors);

    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

fn validate_system(config: &DevtraceConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.system.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
}

fn validate_context(config: &DevtraceConfig, errors: &mut Vec<ConfigValidationError>) {
    let prefix = &config.context.name_prefix;
    if config.context.announce_names && prefix.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "context.name_prefix".to_string(),
        });
    }
    if prefix.len() > MAX_NAME_PREFIX_LEN {
        errors.push(ConfigValidationError::InvalidValue {
            field: "context.name_prefix".to_string(),
            reason: format!(
                "{} bytes exceeds the {} byte limit",
                prefix.len(),
                MAX_NAME_PREFIX_LEN
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DevtraceConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = DevtraceConfig::default();
        config.system.log_level = "WARN".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = DevtraceConfig::default();
        config.system.log_level = "loud".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("system.log_level"));
            assert!(msg.contains("loud"));
        }
    }

    #[test]
    fn test_empty_prefix_only_matters_when_announcing() {
        let mut config = DevtraceConfig::default();
        config.context.name_prefix = "  ".to_string();
        assert!(validate_config(&config).is_err());

        config.context.announce_names = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_problems_reported_together() {
        let mut config = DevtraceConfig::default();
        config.system.log_level = "loud".to_string();
        config.context.name_prefix = "x".repeat(MAX_NAME_PREFIX_LEN + 1);

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation failure");
        };
        assert!(msg.contains("system.log_level"));
        assert!(msg.contains("context.name_prefix"));
        assert_eq!(msg.lines().count(), 3);
    }
}

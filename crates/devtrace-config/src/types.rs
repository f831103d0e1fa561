// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `devtrace_configuration.toml`.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DevtraceConfig {
    pub system: SystemConfig,
    pub context: ContextConfig,
    pub sink: SinkConfig,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    pub debug: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

/// Device context configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Contexts are named `"<prefix> <id>"` when announced
    pub name_prefix: String,
    /// Send each new context's name to the sink
    pub announce_names: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name_prefix: "Device".to_string(),
            announce_names: true,
        }
    }
}

/// Trace sink selection
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
}

/// Where context records go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Structured `tracing` events
    #[default]
    Tracing,
    /// Discard
    Null,
    /// In-memory capture
    Recording,
}

impl SinkKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Tracing => "tracing",
            SinkKind::Null => "null",
            SinkKind::Recording => "recording",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tracing" => Ok(SinkKind::Tracing),
            "null" | "none" => Ok(SinkKind::Null),
            "recording" => Ok(SinkKind::Recording),
            other => Err(ConfigError::InvalidValue(format!(
                "unknown sink kind '{}', expected tracing, null or recording",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_kind_parse() {
        assert_eq!("Recording".parse::<SinkKind>().unwrap(), SinkKind::Recording);
        assert_eq!("none".parse::<SinkKind>().unwrap(), SinkKind::Null);
        assert!("kafka".parse::<SinkKind>().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DevtraceConfig = toml::from_str("[sink]\nkind = \"null\"\n").unwrap();
        assert_eq!(config.sink.kind, SinkKind::Null);
        assert_eq!(config.context, ContextConfig::default());
        assert_eq!(config.system.log_level, "info");
    }

    #[test]
    fn test_round_trip_toml() {
        let config = DevtraceConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("kind = \"tracing\""));
        let parsed: DevtraceConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}

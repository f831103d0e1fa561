// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for targets without a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Console line layout
    pub format: LogFormat,

    /// Print the event target on console lines
    pub with_target: bool,

    /// Base directory for run folders (`file-logging` feature)
    pub log_dir: PathBuf,

    /// Run folders older than this many days are removed
    pub retention_days: u64,

    /// At most this many run folders are kept
    pub retention_runs: usize,
}

/// Console line layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

impl LoggingConfig {
    /// Defaults with a different base level
    pub fn with_level(level: impl Into<String>) -> Self {
        LoggingConfig {
            level: level.into(),
            ..Default::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Full,
            with_target: true,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging setup driven by [`DevtraceConfig`]

use anyhow::Result;
use devtrace_config::DevtraceConfig;
use devtrace_observability::{parse_debug_flags, CrateDebugFlags, LoggingConfig};

/// Logging settings and debug flags implied by `config`
///
/// `system.debug` raises every crate to debug level, on top of any flags given on the
/// command line or through `DEVTRACE_DEBUG`.
pub fn logging_settings(
    config: &DevtraceConfig,
    mut flags: CrateDebugFlags,
) -> (LoggingConfig, CrateDebugFlags) {
    if config.system.debug {
        flags.enable_all();
    }
    (LoggingConfig::with_level(config.system.log_level.clone()), flags)
}

/// Install console logging for this process
pub fn init_logging(config: &DevtraceConfig) -> Result<()> {
    let (logging, flags) = logging_settings(config, parse_debug_flags());
    devtrace_observability::init_console_logging(&logging, &flags)
}

/// Install console and per-run file logging for this process
#[cfg(feature = "file-logging")]
pub fn init_file_logging(config: &DevtraceConfig) -> Result<devtrace_observability::LoggingGuard> {
    let (logging, flags) = logging_settings(config, parse_debug_flags());
    devtrace_observability::init_logging(&logging, &flags)
}

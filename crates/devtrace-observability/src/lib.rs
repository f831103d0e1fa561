// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # devtrace-observability
//!
//! Logging setup shared by the device tracing crates, with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: timestamped run folders with per-crate JSON log files and retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Crate names accepted by `--debug-<crate>` and `DEVTRACE_DEBUG`
pub const KNOWN_CRATES: &[&str] = &[
    "devtrace",
    "devtrace-structures",
    "devtrace-context",
    "devtrace-config",
    "devtrace-observability",
];

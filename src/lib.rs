// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # devtrace - device trace correlation
//!
//! Turns raw profiler markers read back from an accelerator (many chips, each a grid of cores,
//! each core running several RISC execution units) into zone start/end records that a host
//! tracing backend can place on its timeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use devtrace::prelude::*;
//!
//! let mut config = DevtraceConfig::default();
//! config.sink.kind = SinkKind::Recording;
//! let session = TraceSession::from_config(config)?;
//!
//! let mut device = session.create_context()?;
//! device.populate(0, 0.0, 1.0)?;
//!
//! let marker = Marker::new(
//!     HardwareAddress::new(0, 1, 1, 0),
//!     0, 1200, MarkerPhase::Start, 42, "matmul", "brisc.cc", 10, "BRISC-FW",
//!     serde_json::Value::Null,
//! );
//! device.push_start(marker);
//!
//! let recording = session.recording().expect("recording sink configured");
//! assert_eq!(recording.zones()[0].label.as_deref(), Some("OP ID:42"));
//! # Ok::<(), devtrace::SessionError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: devtrace-config, devtrace-observability    │
//! │  (TOML + overrides, logging setup)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Data: devtrace-structures                              │
//! │  (HardwareAddress, Marker, keyword classification)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Correlation: devtrace-context                          │
//! │  (DeviceContext, CorrelationRing, TraceSink, clocks)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Wiring: devtrace::session                              │
//! │  (TraceSession builds sink + clock from configuration)  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: per-run JSON log files with retention
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod logging;
pub mod session;

pub use devtrace_config as config;
pub use devtrace_context as context;
pub use devtrace_observability as observability;
pub use devtrace_structures as structures;

pub use session::{SessionError, SessionResult, TraceSession};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::session::{SessionError, TraceSession};

    pub use devtrace_config::{DevtraceConfig, SinkKind};
    pub use devtrace_context::{
        ClockSource, ContextId, DeviceContext, ManualClock, MonotonicClock, RecordingSink,
        SlotHandle, TraceSink, ZonePhase,
    };
    pub use devtrace_structures::{HardwareAddress, KeywordFlags, Marker, MarkerPhase};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let address = HardwareAddress::from_packed(crate::structures::encode(1, 2, 3, 4));
        assert_eq!(address, HardwareAddress::new(1, 2, 3, 4));
    }
}

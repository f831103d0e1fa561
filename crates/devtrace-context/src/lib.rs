// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Device trace contexts
//!
//! Correlates start/end markers from independently clocked execution units into records a
//! tracing backend can pair later.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   ContextIdGenerator (atomic)       │  ← only state shared between contexts
//! └─────────────────────────────────────┘
//!           ↓
//! ┌─────────────────────────────────────┐
//! │   DeviceContext (one per device)    │  ← single writer, &mut self
//! │   CorrelationRing (65536 slots)     │  ← overwrite-oldest, O(1) allocate
//! └─────────────────────────────────────┘
//!           ↓
//! ┌─────────────────────────────────────┐
//! │   TraceSink                         │  ← pairs Begin/End, owns backpressure
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use devtrace_context::{ContextIdGenerator, DeviceContext, MonotonicClock, RecordingSink};
//! use devtrace_structures::{HardwareAddress, Marker, MarkerPhase};
//!
//! let ids = ContextIdGenerator::new();
//! let sink = Arc::new(RecordingSink::new());
//! let mut context = DeviceContext::create(&ids, sink.clone(), Arc::new(MonotonicClock::new()));
//! context.populate(1, 0.0, 1.0)?;
//!
//! let marker = Marker::new(
//!     HardwareAddress::new(0, 1, 1, 0),
//!     0, 1200, MarkerPhase::Start, 42, "matmul", "brisc.cc", 10, "BRISC-FW",
//!     serde_json::Value::Null,
//! );
//! let handle = context.push_start(marker);
//! assert_eq!(sink.zones()[0].label.as_deref(), Some("OP ID:42"));
//! assert!(context.slot(handle).is_some());
//! context.destroy();
//! # Ok::<(), devtrace_context::ContextError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod clock;
pub mod context;
mod error;
pub mod ids;
pub mod ring;
pub mod sink;

pub use clock::{ClockSource, ManualClock, MonotonicClock};
pub use context::{Calibration, DeviceContext, MAX_CONTEXT_NAME_LEN};
pub use error::{ContextError, ContextResult};
pub use ids::{ContextId, ContextIdGenerator};
pub use ring::{CorrelationRing, CorrelationSlot, SlotHandle, ZonePhase, SLOT_CAPACITY};
pub use sink::{
    CalibrationUpdate, ContextAnnouncement, NullSink, RecordedZone, RecordingSink, SinkRecord,
    TraceSink, TracingSink, ZoneEvent,
};

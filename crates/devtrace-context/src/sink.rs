// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trace sink contract
//!
//! Contexts hand every record to a [`TraceSink`] and never wait on it. Sinks are expected to
//! be order-insensitive: they pair Begin/End themselves, by `(context, handle)` or by the
//! marker's hardware address and ordinal.
//!
//! ```text
//! DeviceContext ──context_created────▶ TraceSink
//!               ──context_calibrated─▶
//!               ──context_named──────▶
//!               ──zone (Begin/End)───▶
//! ```

use crate::ids::ContextId;
use crate::ring::{SlotHandle, ZonePhase};
use devtrace_structures::Marker;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// First calibration of a context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextAnnouncement {
    pub context: ContextId,
    pub host_time: i64,
    /// Device origin converted with the announced frequency
    pub device_time: i64,
    pub period: f32,
    pub calibrated: bool,
}

/// Refinement of the device-to-host mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationUpdate {
    pub context: ContextId,
    pub host_time: i64,
    pub device_time: i64,
    /// Host time elapsed since the previous sync point, scaled to nanoseconds
    pub host_delta: i64,
}

/// One zone edge, borrowed from the context's ring
#[derive(Debug, Clone, Copy)]
pub struct ZoneEvent<'a> {
    pub context: ContextId,
    pub handle: SlotHandle,
    pub phase: ZonePhase,
    pub marker: &'a Marker,
    /// Only Begin events carry a label
    pub label: Option<&'a str>,
    /// Host time at which the event was pushed
    pub host_time: i64,
    /// Marker timestamp mapped through the context calibration, `None` when uncalibrated
    pub device_time: Option<i64>,
}

/// Consumer of context records
pub trait TraceSink: Send + Sync {
    fn context_created(&self, announcement: &ContextAnnouncement);

    fn context_calibrated(&self, update: &CalibrationUpdate);

    fn context_named(&self, context: ContextId, name: &str);

    fn zone(&self, event: &ZoneEvent<'_>);
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn context_created(&self, _announcement: &ContextAnnouncement) {}

    fn context_calibrated(&self, _update: &CalibrationUpdate) {}

    fn context_named(&self, _context: ContextId, _name: &str) {}

    fn zone(&self, _event: &ZoneEvent<'_>) {}
}

/// Forwards records as structured `tracing` events under the `devtrace::sink` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn context_created(&self, announcement: &ContextAnnouncement) {
        info!(
            target: "devtrace::sink",
            context = announcement.context.0,
            host_time = announcement.host_time,
            device_time = announcement.device_time,
            "Device context created"
        );
    }

    fn context_calibrated(&self, update: &CalibrationUpdate) {
        debug!(
            target: "devtrace::sink",
            context = update.context.0,
            host_time = update.host_time,
            device_time = update.device_time,
            host_delta = update.host_delta,
            "Device context calibrated"
        );
    }

    fn context_named(&self, context: ContextId, name: &str) {
        info!(target: "devtrace::sink", context = context.0, name, "Device context named");
    }

    fn zone(&self, event: &ZoneEvent<'_>) {
        trace!(
            target: "devtrace::sink",
            context = event.context.0,
            handle = event.handle.0,
            phase = ?event.phase,
            thread = event.marker.thread_id(),
            zone = event.marker.marker_name(),
            label = event.label,
            device_time = event.device_time,
            "Zone"
        );
    }
}

/// Owned copy of a zone event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedZone {
    pub context: ContextId,
    pub handle: SlotHandle,
    pub phase: ZonePhase,
    pub marker: Marker,
    pub label: Option<String>,
    pub host_time: i64,
    pub device_time: Option<i64>,
}

impl From<&ZoneEvent<'_>> for RecordedZone {
    fn from(event: &ZoneEvent<'_>) -> Self {
        Self {
            context: event.context,
            handle: event.handle,
            phase: event.phase,
            marker: event.marker.clone(),
            label: event.label.map(str::to_string),
            host_time: event.host_time,
            device_time: event.device_time,
        }
    }
}

/// Everything a [`RecordingSink`] has seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkRecord {
    Created(ContextAnnouncement),
    Calibrated(CalibrationUpdate),
    Named { context: ContextId, name: String },
    Zone(RecordedZone),
}

/// In-memory capture, for offline inspection and tests
///
/// Copies every record, so it is not meant for the allocation-free hot path.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<SinkRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Snapshot of all records in arrival order
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.lock().clone()
    }

    /// Zone records only
    pub fn zones(&self) -> Vec<RecordedZone> {
        self.records
            .lock()
            .iter()
            .filter_map(|record| match record {
                SinkRecord::Zone(zone) => Some(zone.clone()),
                _ => None,
            })
            .collect()
    }

    /// Remove and return all records
    pub fn take(&self) -> Vec<SinkRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    /// One JSON object per line
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let records = self.records.lock();
        let mut out = String::new();
        for record in records.iter() {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    fn push(&self, record: SinkRecord) {
        self.records.lock().push(record);
    }
}

impl TraceSink for RecordingSink {
    fn context_created(&self, announcement: &ContextAnnouncement) {
        self.push(SinkRecord::Created(*announcement));
    }

    fn context_calibrated(&self, update: &CalibrationUpdate) {
        self.push(SinkRecord::Calibrated(*update));
    }

    fn context_named(&self, context: ContextId, name: &str) {
        self.push(SinkRecord::Named {
            context,
            name: name.to_string(),
        });
    }

    fn zone(&self, event: &ZoneEvent<'_>) {
        self.push(SinkRecord::Zone(RecordedZone::from(event)));
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Device context - correlation scope of one physical device
//!
//! Lifecycle:
//!
//! ```text
//! create ──▶ { populate | calibrate | set_name | push_start | push_end }* ──▶ destroy
//! ```
//!
//! There is no active/inactive state. Calibration may change at any time and only affects
//! how the sink maps timestamps recorded afterwards; raw marker timestamps are never rewritten.
//!
//! A context has exactly one writer. Mutating calls take `&mut self`, so sharing one context
//! between producers requires the caller to serialize access.

use crate::clock::ClockSource;
use crate::error::{ContextError, ContextResult};
use crate::ids::{ContextId, ContextIdGenerator};
use crate::ring::{CorrelationRing, CorrelationSlot, SlotHandle, ZonePhase};
use crate::sink::{CalibrationUpdate, ContextAnnouncement, TraceSink, ZoneEvent};
use devtrace_structures::{derive_label, Marker};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest context name the sink accepts (16-bit length prefix)
pub const MAX_CONTEXT_NAME_LEN: usize = u16::MAX as usize;

/// Device clock to host clock mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Device ticks per host tick
    pub frequency: f64,
    /// Device time at the synchronization point, in device ticks
    pub device_origin: f64,
}

impl Calibration {
    pub fn new(frequency: f64, device_origin: f64) -> ContextResult<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ContextError::InvalidFrequency(frequency));
        }
        Ok(Self {
            frequency,
            device_origin,
        })
    }

    /// Convert device ticks to host ticks
    #[inline]
    pub fn to_host_ticks(&self, device_ticks: f64) -> i64 {
        (device_ticks / self.frequency).round() as i64
    }
}

/// Correlation scope of one device: calibration state plus its marker ring
pub struct DeviceContext {
    id: ContextId,
    name: Option<String>,
    calibration: Option<Calibration>,
    last_sync_host_time: i64,
    ring: CorrelationRing,
    sink: Arc<dyn TraceSink>,
    clock: Arc<dyn ClockSource>,
}

impl DeviceContext {
    /// Create a context with a fresh id and an empty ring of
    /// [`SLOT_CAPACITY`](crate::ring::SLOT_CAPACITY) slots.
    pub fn create(
        ids: &ContextIdGenerator,
        sink: Arc<dyn TraceSink>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Self::with_ring(ids, CorrelationRing::new(), sink, clock)
    }

    /// Create a context around a caller-sized ring
    pub fn with_ring(
        ids: &ContextIdGenerator,
        ring: CorrelationRing,
        sink: Arc<dyn TraceSink>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        let id = ids.next_id();
        debug!(context = id.0, capacity = ring.capacity(), "Created device context");
        Self {
            id,
            name: None,
            calibration: None,
            last_sync_host_time: 0,
            ring,
            sink,
            clock,
        }
    }

    /// Release the slot storage
    pub fn destroy(self) {
        debug!(
            context = self.id.0,
            allocations = self.ring.allocations(),
            "Destroyed device context"
        );
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Zone edges pushed since creation
    pub fn allocations(&self) -> u64 {
        self.ring.allocations()
    }

    /// Install the initial device-to-host mapping and announce the context to the sink.
    ///
    /// A `host_time` of 0 means "use the clock's last sync time".
    pub fn populate(&mut self, host_time: i64, device_time: f64, frequency: f64) -> ContextResult<()> {
        let calibration = self.checked_calibration(frequency, device_time)?;
        let host_time = self.resolve_host_time(host_time);

        self.calibration = Some(calibration);
        self.sink.context_created(&ContextAnnouncement {
            context: self.id,
            host_time,
            device_time: calibration.to_host_ticks(device_time),
            period: 1.0,
            calibrated: true,
        });
        self.last_sync_host_time = host_time;

        info!(
            context = self.id.0,
            host_time,
            frequency,
            "Populated device context"
        );
        Ok(())
    }

    /// Refine the device-to-host mapping. Same conventions as [`DeviceContext::populate`].
    pub fn calibrate(&mut self, host_time: i64, device_time: f64, frequency: f64) -> ContextResult<()> {
        let calibration = self.checked_calibration(frequency, device_time)?;
        let host_time = self.resolve_host_time(host_time);
        // host ticks wrap like the unsigned counter they come from
        let elapsed = host_time.wrapping_sub(self.last_sync_host_time);
        let host_delta = (elapsed as f64 * self.clock.timer_multiplier()) as i64;

        self.calibration = Some(calibration);
        self.sink.context_calibrated(&CalibrationUpdate {
            context: self.id,
            host_time,
            device_time: calibration.to_host_ticks(device_time),
            host_delta,
        });
        self.last_sync_host_time = host_time;

        debug!(context = self.id.0, host_time, host_delta, "Calibrated device context");
        Ok(())
    }

    /// Give the context a display name
    pub fn set_name(&mut self, name: impl Into<String>) -> ContextResult<()> {
        let name = name.into();
        if name.len() > MAX_CONTEXT_NAME_LEN {
            return Err(ContextError::NameTooLong {
                len: name.len(),
                max: MAX_CONTEXT_NAME_LEN,
            });
        }
        self.sink.context_named(self.id, &name);
        self.name = Some(name);
        Ok(())
    }

    /// Record a zone start. Allocates at most the label string.
    pub fn push_start(&mut self, marker: Marker) -> SlotHandle {
        let host_time = self.clock.now();
        let (handle, slot) = self.ring.allocate_slot(marker, ZonePhase::Begin);
        let label = derive_label(&slot.marker);

        self.sink.zone(&ZoneEvent {
            context: self.id,
            handle,
            phase: ZonePhase::Begin,
            marker: &slot.marker,
            label: label.as_deref(),
            host_time,
            device_time: device_time(self.calibration, &slot.marker),
        });
        handle
    }

    /// Record a zone end. Never allocates.
    pub fn push_end(&mut self, marker: Marker) -> SlotHandle {
        let host_time = self.clock.now();
        let (handle, slot) = self.ring.allocate_slot(marker, ZonePhase::End);

        self.sink.zone(&ZoneEvent {
            context: self.id,
            handle,
            phase: ZonePhase::End,
            marker: &slot.marker,
            label: None,
            host_time,
            device_time: device_time(self.calibration, &slot.marker),
        });
        handle
    }

    /// Current occupant of a handle's slot, see [`CorrelationRing::get`]
    pub fn slot(&self, handle: SlotHandle) -> Option<&CorrelationSlot> {
        self.ring.get(handle)
    }

    fn checked_calibration(&self, frequency: f64, device_time: f64) -> ContextResult<Calibration> {
        Calibration::new(frequency, device_time).map_err(|e| {
            warn!(context = self.id.0, "Rejected calibration: {}", e);
            e
        })
    }

    fn resolve_host_time(&self, host_time: i64) -> i64 {
        if host_time == 0 {
            self.clock.sync_time()
        } else {
            host_time
        }
    }
}

fn device_time(calibration: Option<Calibration>, marker: &Marker) -> Option<i64> {
    let calibration = calibration?;
    marker
        .timestamp()
        .map(|ticks| calibration.to_host_ticks(ticks as f64))
}

impl fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("calibration", &self.calibration)
            .field("last_sync_host_time", &self.last_sync_host_time)
            .field("ring", &self.ring)
            .finish()
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Correlation ring - fixed arena of marker snapshots addressed by handle
//!
//! Architecture:
//! - One slot per handle, allocated once when the ring is built
//! - Allocation writes in place at `head`; once full, the oldest slot is overwritten
//! - Eviction is cursor bookkeeping only, nothing is moved
//!
//! Handles are weak references: reading a handle after its slot was reused returns the newer
//! occupant. Consumers that need a specific occurrence must compare the marker they get back.

use crate::error::{ContextError, ContextResult};
use devtrace_structures::Marker;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Slots per device context
pub const SLOT_CAPACITY: usize = 64 * 1024;

/// Whether a slot opened or closed a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZonePhase {
    Begin,
    End,
}

/// Index into a context's ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotHandle(pub u32);

impl fmt::Display for SlotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// Marker snapshot owned by one context
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSlot {
    pub marker: Marker,
    pub phase: ZonePhase,
}

/// Fixed-capacity FIFO-overwrite ring of correlation slots
pub struct CorrelationRing {
    slots: Box<[Option<CorrelationSlot>]>,
    /// Index at which the next slot is written
    head: usize,
    /// Oldest retained slot
    tail: usize,
    allocations: u64,
}

impl CorrelationRing {
    /// Ring with the standard [`SLOT_CAPACITY`]
    pub fn new() -> Self {
        Self::build(SLOT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> ContextResult<Self> {
        if capacity < 2 {
            return Err(ContextError::CapacityTooSmall(capacity));
        }
        if capacity as u64 > u32::MAX as u64 + 1 {
            return Err(ContextError::CapacityTooLarge(capacity));
        }
        Ok(Self::build(capacity))
    }

    fn build(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            allocations: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Total allocations since creation, evicted ones included
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Number of slots currently holding a snapshot
    pub fn occupied(&self) -> usize {
        self.allocations.min(self.capacity() as u64) as usize
    }

    /// Store `(marker, phase)` and return its handle, evicting the oldest slot when full.
    pub fn allocate(&mut self, marker: Marker, phase: ZonePhase) -> SlotHandle {
        self.allocate_slot(marker, phase).0
    }

    /// [`CorrelationRing::allocate`], also returning the stored snapshot.
    pub(crate) fn allocate_slot(
        &mut self,
        marker: Marker,
        phase: ZonePhase,
    ) -> (SlotHandle, &CorrelationSlot) {
        let capacity = self.capacity();
        let index = self.head;

        if (self.head + 1) % capacity == self.tail {
            self.tail = self.head;
        }
        if self.slots[index].is_some() {
            trace!(slot = index, "Evicting correlation slot");
        }

        let slot = self.slots[index].insert(CorrelationSlot { marker, phase });

        self.head = (self.head + 1) % capacity;
        assert_ne!(
            self.head, self.tail,
            "correlation ring cursors collided after allocating slot {}",
            index
        );
        self.allocations += 1;

        (SlotHandle(index as u32), slot)
    }

    /// Current occupant of the handle's slot. No staleness check is made.
    pub fn get(&self, handle: SlotHandle) -> Option<&CorrelationSlot> {
        self.slots[handle.0 as usize % self.capacity()].as_ref()
    }

    /// Handle the next allocation will return
    pub fn next_handle(&self) -> SlotHandle {
        SlotHandle(self.head as u32)
    }
}

impl Default for CorrelationRing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CorrelationRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationRing")
            .field("capacity", &self.capacity())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("allocations", &self.allocations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devtrace_structures::{HardwareAddress, MarkerPhase};

    fn numbered(n: u64) -> Marker {
        Marker::new(
            HardwareAddress::new(0, 0, 0, 0),
            n,
            n,
            MarkerPhase::Start,
            0,
            "",
            "",
            0,
            "zone",
            serde_json::Value::Null,
        )
    }

    #[test]
    fn test_capacity_bounds() {
        assert_eq!(
            CorrelationRing::with_capacity(1).unwrap_err(),
            ContextError::CapacityTooSmall(1)
        );
        assert!(CorrelationRing::with_capacity(2).is_ok());
        assert_eq!(CorrelationRing::new().capacity(), SLOT_CAPACITY);
    }

    #[test]
    fn test_handles_follow_allocation_order() {
        let mut ring = CorrelationRing::with_capacity(8).unwrap();
        let handles: Vec<_> = (0..5)
            .map(|n| ring.allocate(numbered(n), ZonePhase::Begin))
            .collect();
        assert_eq!(handles, (0..5).map(SlotHandle).collect::<Vec<_>>());
        assert_eq!(ring.occupied(), 5);
        assert_eq!(ring.next_handle(), SlotHandle(5));
    }

    #[test]
    fn test_unwritten_slot_is_empty() {
        let ring = CorrelationRing::with_capacity(4).unwrap();
        assert!(ring.get(SlotHandle(3)).is_none());
    }

    #[test]
    fn test_fifo_eviction_small_ring() {
        let capacity = 4u64;
        let mut ring = CorrelationRing::with_capacity(capacity as usize).unwrap();
        // allocation k (1-based) stores marker k
        for k in 1..=capacity + 5 {
            ring.allocate(numbered(k), ZonePhase::End);
        }
        assert_eq!(ring.occupied(), capacity as usize);
        assert_eq!(ring.allocations(), capacity + 5);

        // the last `capacity` allocations survive, each in slot (k - 1) % capacity
        for k in 6..=capacity + 5 {
            let slot = ring.get(SlotHandle(((k - 1) % capacity) as u32)).unwrap();
            assert_eq!(slot.marker.marker_id(), Some(k));
            assert_eq!(slot.phase, ZonePhase::End);
        }
    }

    #[test]
    fn test_stale_handle_returns_newer_occupant() {
        let mut ring = CorrelationRing::with_capacity(2).unwrap();
        let first = ring.allocate(numbered(1), ZonePhase::Begin);
        ring.allocate(numbered(2), ZonePhase::Begin);
        ring.allocate(numbered(3), ZonePhase::End);
        let slot = ring.get(first).unwrap();
        assert_eq!(slot.marker.marker_id(), Some(3));
        assert_eq!(slot.phase, ZonePhase::End);
    }

    #[test]
    fn test_handle_wraps_on_lookup() {
        let mut ring = CorrelationRing::with_capacity(4).unwrap();
        ring.allocate(numbered(1), ZonePhase::Begin);
        let slot = ring.get(SlotHandle(4)).unwrap();
        assert_eq!(slot.marker.marker_id(), Some(1));
    }
}

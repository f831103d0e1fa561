// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Packed hardware address codec
//!
//! A hardware location is packed low-to-high into a single `u64`:
//!
//! ```text
//!  63 ........ 35 | 34 ..... 19 | 18 .. 11 | 10 .. 7 | 6 .. 3 | 2 .. 0
//!     reserved    |  run (16)   | chip (8) | y (4)   | x (4)  | unit (3)
//! ```
//!
//! Encoding never validates: a field wider than its slot spills into the neighbouring
//! field. Existing traces depend on this bit-exact behaviour, so out-of-range input is a
//! caller precondition rather than an error. Decoding masks every field back to its width.

use crate::error::{StructuresError, StructuresResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EXECUTION_UNIT_BIT_COUNT: u64 = 3;
pub const CORE_X_BIT_COUNT: u64 = 4;
pub const CORE_Y_BIT_COUNT: u64 = 4;
pub const CHIP_BIT_COUNT: u64 = 8;
pub const RUN_BIT_COUNT: u64 = 16;

pub const CORE_X_BIT_SHIFT: u64 = EXECUTION_UNIT_BIT_COUNT;
pub const CORE_Y_BIT_SHIFT: u64 = CORE_X_BIT_SHIFT + CORE_X_BIT_COUNT;
pub const CHIP_BIT_SHIFT: u64 = CORE_Y_BIT_SHIFT + CORE_Y_BIT_COUNT;
pub const RUN_BIT_SHIFT: u64 = CHIP_BIT_SHIFT + CHIP_BIT_COUNT;

const _: () = assert!(RUN_BIT_SHIFT + RUN_BIT_COUNT <= u64::BITS as u64);

const fn mask(bits: u64) -> u64 {
    (1 << bits) - 1
}

/// Execution unit names, indexed by unit number.
pub const EXECUTION_UNIT_NAMES: [&str; 7] = [
    "BRISC", "NCRISC", "TRISC_0", "TRISC_1", "TRISC_2", "ERISC", "CORE_AGG",
];

/// Reserved unit index that aggregates a whole core rather than one engine.
pub const AGGREGATE_EXECUTION_UNIT: u8 = 6;

/// Name of an execution unit index, if it has one.
pub fn execution_unit_name(unit: u8) -> Option<&'static str> {
    EXECUTION_UNIT_NAMES.get(unit as usize).copied()
}

/// Index of a named execution unit (`"BRISC"` → 0, `"CORE_AGG"` → 6).
pub fn execution_unit_index(name: &str) -> StructuresResult<u8> {
    EXECUTION_UNIT_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|index| index as u8)
        .ok_or_else(|| StructuresError::UnknownExecutionUnit(name.to_string()))
}

/// Pack a hardware location into its 19-bit identity.
#[inline]
pub const fn encode(chip_id: u8, core_x: u8, core_y: u8, execution_unit: u8) -> u64 {
    (execution_unit as u64)
        | (core_x as u64) << CORE_X_BIT_SHIFT
        | (core_y as u64) << CORE_Y_BIT_SHIFT
        | (chip_id as u64) << CHIP_BIT_SHIFT
}

/// Unpack an identity into `(chip_id, core_x, core_y, execution_unit)`.
///
/// Bits above the chip field (the run discriminator included) are ignored.
#[inline]
pub const fn decode(packed: u64) -> (u8, u8, u8, u8) {
    (
        ((packed >> CHIP_BIT_SHIFT) & mask(CHIP_BIT_COUNT)) as u8,
        ((packed >> CORE_X_BIT_SHIFT) & mask(CORE_X_BIT_COUNT)) as u8,
        ((packed >> CORE_Y_BIT_SHIFT) & mask(CORE_Y_BIT_COUNT)) as u8,
        (packed & mask(EXECUTION_UNIT_BIT_COUNT)) as u8,
    )
}

/// Pack a location with a run discriminator in the reserved high bits.
#[inline]
pub const fn encode_with_run(address: HardwareAddress, run: u16) -> u64 {
    address.packed() | (run as u64) << RUN_BIT_SHIFT
}

/// Run discriminator stored above the location bits.
#[inline]
pub const fn run_of(packed: u64) -> u16 {
    ((packed >> RUN_BIT_SHIFT) & mask(RUN_BIT_COUNT)) as u16
}

/// Physical location of one execution unit.
///
/// Field declaration order is the comparison order used by marker ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HardwareAddress {
    pub chip_id: u8,
    pub core_x: u8,
    pub core_y: u8,
    pub execution_unit: u8,
}

impl HardwareAddress {
    pub const fn new(chip_id: u8, core_x: u8, core_y: u8, execution_unit: u8) -> Self {
        Self {
            chip_id,
            core_x,
            core_y,
            execution_unit,
        }
    }

    pub const fn from_packed(packed: u64) -> Self {
        let (chip_id, core_x, core_y, execution_unit) = decode(packed);
        Self::new(chip_id, core_x, core_y, execution_unit)
    }

    #[inline]
    pub const fn packed(&self) -> u64 {
        encode(self.chip_id, self.core_x, self.core_y, self.execution_unit)
    }

    /// Packed identity with a run discriminator in the reserved high bits.
    #[inline]
    pub const fn packed_with_run(&self, run: u16) -> u64 {
        encode_with_run(*self, run)
    }

    pub fn execution_unit_name(&self) -> Option<&'static str> {
        execution_unit_name(self.execution_unit)
    }

    pub const fn is_aggregate(&self) -> bool {
        self.execution_unit == AGGREGATE_EXECUTION_UNIT
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip {} core ({}, {}) ", self.chip_id, self.core_x, self.core_y)?;
        match self.execution_unit_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "unit {}", self.execution_unit),
        }
    }
}

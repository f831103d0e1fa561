// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Marker name classification
//!
//! Every marker name is tested once, at construction, against a closed vocabulary of
//! keywords. Each keyword owns one bit of [`KeywordFlags`]; flags are independent, so a name
//! such as `"PROFILER-DISPATCH"` carries both the profiler and the dispatch bit.

use crate::address::AGGREGATE_EXECUTION_UNIT;
use crate::marker::Marker;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type KeywordFlagsBitmask = u16;

// Bits 0-8 -> one per MarkerNameKeyword
// Bits 9-15 -> RESERVED

/// Recognized substrings of marker names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MarkerNameKeyword {
    /// Firmware entry of the primary data-movement engine
    BriscFw = 0,
    /// Firmware entry of an ethernet engine
    EriscFw = 1,
    SyncZone = 2,
    /// Zones emitted by the profiler itself
    Profiler = 3,
    Dispatch = 4,
    ProcessCmd = 5,
    RuntimeHostIdDispatch = 6,
    PackedDataDispatch = 7,
    PackedLargeDataDispatch = 8,
}

impl MarkerNameKeyword {
    pub const COUNT: usize = 9;

    pub const ALL: [MarkerNameKeyword; Self::COUNT] = [
        Self::BriscFw,
        Self::EriscFw,
        Self::SyncZone,
        Self::Profiler,
        Self::Dispatch,
        Self::ProcessCmd,
        Self::RuntimeHostIdDispatch,
        Self::PackedDataDispatch,
        Self::PackedLargeDataDispatch,
    ];

    /// Text searched for in marker names (case sensitive).
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::BriscFw => "BRISC-FW",
            Self::EriscFw => "ERISC-FW",
            Self::SyncZone => "SYNC-ZONE",
            Self::Profiler => "PROFILER",
            Self::Dispatch => "DISPATCH",
            Self::ProcessCmd => "process_cmd",
            Self::RuntimeHostIdDispatch => "runtime_host_id_dispatch",
            Self::PackedDataDispatch => "packed_data_dispatch",
            Self::PackedLargeDataDispatch => "packed_large_data_dispatch",
        }
    }

    #[inline]
    pub const fn bit(self) -> KeywordFlagsBitmask {
        1 << (self as u8)
    }
}

impl fmt::Display for MarkerNameKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One flag per [`MarkerNameKeyword`].
///
/// Deserialization goes through [`KeywordFlags::from_bitmask`], so reserved bits never load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "KeywordFlagsBitmask", into = "KeywordFlagsBitmask")]
pub struct KeywordFlags(KeywordFlagsBitmask);

impl From<KeywordFlagsBitmask> for KeywordFlags {
    fn from(bits: KeywordFlagsBitmask) -> Self {
        KeywordFlags::from_bitmask(bits)
    }
}

impl From<KeywordFlags> for KeywordFlagsBitmask {
    fn from(flags: KeywordFlags) -> Self {
        flags.bitmask()
    }
}

impl KeywordFlags {
    pub const EMPTY: KeywordFlags = KeywordFlags(0);

    /// Only the vocabulary bits survive, reserved bits are dropped.
    pub const fn from_bitmask(bits: KeywordFlagsBitmask) -> Self {
        KeywordFlags(bits & ((1 << MarkerNameKeyword::COUNT) - 1))
    }

    pub const fn bitmask(&self) -> KeywordFlagsBitmask {
        self.0
    }

    #[inline]
    pub const fn contains(&self, keyword: MarkerNameKeyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    pub const fn with(self, keyword: MarkerNameKeyword) -> Self {
        KeywordFlags(self.0 | keyword.bit())
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Either firmware-entry flag is set.
    #[inline]
    pub const fn is_firmware_entry(&self) -> bool {
        self.contains(MarkerNameKeyword::BriscFw) || self.contains(MarkerNameKeyword::EriscFw)
    }

    pub fn iter(&self) -> impl Iterator<Item = MarkerNameKeyword> + '_ {
        MarkerNameKeyword::ALL
            .into_iter()
            .filter(move |keyword| self.contains(*keyword))
    }
}

/// Flag every vocabulary keyword occurring in `name`.
pub fn classify(name: &str) -> KeywordFlags {
    MarkerNameKeyword::ALL
        .into_iter()
        .filter(|keyword| name.contains(keyword.keyword()))
        .fold(KeywordFlags::EMPTY, KeywordFlags::with)
}

/// Secondary zone text identifying the run a firmware zone belongs to.
///
/// Only firmware-entry markers with a non-zero runtime host id get a label; every other
/// marker gets `None`, which keeps the number of distinct zone descriptions a viewer has to
/// intern bounded.
pub fn derive_label(marker: &Marker) -> Option<String> {
    if !marker.keyword_flags().is_firmware_entry() {
        return None;
    }
    let runtime_host_id = marker.runtime_host_id().filter(|id| *id > 0)?;
    let prefix = match marker.address() {
        Some(address) if address.execution_unit == AGGREGATE_EXECUTION_UNIT => "TRACE ID:",
        _ => "OP ID:",
    };
    Some(format!("{}{}", prefix, runtime_host_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_co_occurrence() {
        let flags = classify("PROFILER-DISPATCH");
        assert!(flags.contains(MarkerNameKeyword::Profiler));
        assert!(flags.contains(MarkerNameKeyword::Dispatch));
        assert_eq!(flags.iter().count(), 2);
    }

    #[test]
    fn test_no_match() {
        let flags = classify("plain");
        assert!(flags.is_empty());
        for keyword in MarkerNameKeyword::ALL {
            assert!(!flags.contains(keyword), "{} should be clear", keyword);
        }
    }

    #[test]
    fn test_nested_dispatch_keywords() {
        let flags = classify("cq_dispatch_packed_large_data_dispatch");
        assert!(flags.contains(MarkerNameKeyword::PackedLargeDataDispatch));
        assert!(!flags.contains(MarkerNameKeyword::PackedDataDispatch));
        // match is case sensitive
        assert!(!flags.contains(MarkerNameKeyword::Dispatch));

        let flags = classify("runtime_host_id_dispatch");
        assert!(flags.contains(MarkerNameKeyword::RuntimeHostIdDispatch));
    }

    #[test]
    fn test_firmware_entry() {
        assert!(classify("BRISC-FW").is_firmware_entry());
        assert!(classify("ERISC-FW").is_firmware_entry());
        assert!(!classify("SYNC-ZONE").is_firmware_entry());
    }

    #[test]
    fn test_bitmask_drops_reserved_bits() {
        let flags = KeywordFlags::from_bitmask(0xFFFF);
        assert_eq!(flags.bitmask(), 0x01FF);
        assert_eq!(flags.iter().count(), MarkerNameKeyword::COUNT);
    }

    #[test]
    fn test_deserialize_drops_reserved_bits() {
        let flags: KeywordFlags = serde_json::from_str("65535").unwrap();
        assert_eq!(flags.bitmask(), 0x01FF);

        let flags = classify("SYNC-ZONE");
        assert_eq!(serde_json::to_string(&flags).unwrap(), "4");
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Device marker record
//!
//! A [`Marker`] is one timestamped event emitted by an execution unit. Its identity is the
//! hardware address plus a per-unit marker ordinal; equality, ordering and hashing all look at
//! the same six values, in this order:
//!
//! ```text
//! (timestamp, chip_id, core_x, core_y, execution_unit, marker_id)
//! ```
//!
//! Every comparison goes through [`Marker::raw_identity`], where a field that was never
//! populated reads as [`UNSET_SENTINEL`] and an ordinal meaning "any occurrence" reads as
//! [`ANY_SENTINEL`]. Both therefore sort after every ordinary value, "any" last.

use crate::address::HardwareAddress;
use crate::error::StructuresError;
use crate::keyword::{classify, KeywordFlags};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Value external raw records use for a numeric field that was never populated.
pub const UNSET_SENTINEL: u64 = 1 << 63;

/// Raw value of an ordinal that matches any occurrence on its execution unit (`-1`).
pub const ANY_SENTINEL: u64 = u64::MAX;

/// Odd multiplier of the identity hash combiner.
const HASH_MULTIPLIER: u64 = 0x517c_c1b7_2722_0a95;

/// Marker or runtime host ordinal.
///
/// Serialized as an optional integer: `null` is unset, [`ANY_SENTINEL`] is any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum MarkerOrdinal {
    #[default]
    Unset,
    Any,
    Id(u64),
}

impl MarkerOrdinal {
    /// Reads the two sentinel values back as `Unset` and `Any`.
    pub const fn from_raw(raw: u64) -> Self {
        match raw {
            UNSET_SENTINEL => MarkerOrdinal::Unset,
            ANY_SENTINEL => MarkerOrdinal::Any,
            id => MarkerOrdinal::Id(id),
        }
    }

    pub const fn raw(&self) -> u64 {
        match self {
            MarkerOrdinal::Unset => UNSET_SENTINEL,
            MarkerOrdinal::Any => ANY_SENTINEL,
            MarkerOrdinal::Id(id) => *id,
        }
    }

    pub const fn id(&self) -> Option<u64> {
        match self {
            MarkerOrdinal::Id(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Option<u64>> for MarkerOrdinal {
    fn from(value: Option<u64>) -> Self {
        value.map_or(MarkerOrdinal::Unset, MarkerOrdinal::from_raw)
    }
}

impl From<MarkerOrdinal> for Option<u64> {
    fn from(ordinal: MarkerOrdinal) -> Self {
        match ordinal {
            MarkerOrdinal::Unset => None,
            other => Some(other.raw()),
        }
    }
}

/// Role of a marker within a logical interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerPhase {
    #[default]
    Start,
    End,
    Total,
    TimeseriesData,
    TimeseriesEvent,
}

impl MarkerPhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MarkerPhase::Start => "start",
            MarkerPhase::End => "end",
            MarkerPhase::Total => "total",
            MarkerPhase::TimeseriesData => "ts_data",
            MarkerPhase::TimeseriesEvent => "ts_event",
        }
    }

    /// Start and End open and close a zone; the rest are point records.
    pub const fn is_zone_edge(&self) -> bool {
        matches!(self, MarkerPhase::Start | MarkerPhase::End)
    }
}

impl fmt::Display for MarkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkerPhase {
    type Err = StructuresError;

    /// Accepts the lowercase names and the upper-case forms found in device logs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" | "ZONE_START" => Ok(MarkerPhase::Start),
            "end" | "ZONE_END" => Ok(MarkerPhase::End),
            "total" | "ZONE_TOTAL" => Ok(MarkerPhase::Total),
            "ts_data" | "TS_DATA" => Ok(MarkerPhase::TimeseriesData),
            "ts_event" | "TS_EVENT" => Ok(MarkerPhase::TimeseriesEvent),
            other => Err(StructuresError::UnknownPhase(other.to_string())),
        }
    }
}

/// One timestamped event emitted by an execution unit.
///
/// Fields are read-only after construction: the keyword flags are derived from
/// `marker_name` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "MarkerFields")]
pub struct Marker {
    address: Option<HardwareAddress>,
    marker_id: MarkerOrdinal,
    timestamp: Option<u64>,
    phase: MarkerPhase,
    runtime_host_id: MarkerOrdinal,
    op_name: String,
    file: String,
    line: Option<u64>,
    marker_name: String,
    metadata: serde_json::Value,
    #[serde(skip_serializing)]
    keyword_flags: KeywordFlags,
}

/// Serialized shape of a marker; flags are recomputed instead of trusted.
#[derive(Deserialize)]
struct MarkerFields {
    address: Option<HardwareAddress>,
    #[serde(default)]
    marker_id: MarkerOrdinal,
    timestamp: Option<u64>,
    #[serde(default)]
    phase: MarkerPhase,
    #[serde(default)]
    runtime_host_id: MarkerOrdinal,
    #[serde(default)]
    op_name: String,
    #[serde(default)]
    file: String,
    line: Option<u64>,
    #[serde(default)]
    marker_name: String,
    #[serde(default)]
    metadata: serde_json::Value,
}

impl From<MarkerFields> for Marker {
    fn from(fields: MarkerFields) -> Self {
        let keyword_flags = classify(&fields.marker_name);
        Marker {
            address: fields.address,
            marker_id: fields.marker_id,
            timestamp: fields.timestamp,
            phase: fields.phase,
            runtime_host_id: fields.runtime_host_id,
            op_name: fields.op_name,
            file: fields.file,
            line: fields.line,
            marker_name: fields.marker_name,
            metadata: fields.metadata,
            keyword_flags,
        }
    }
}

impl Default for Marker {
    /// Placeholder with every numeric field unset, used before a record is fully decoded.
    fn default() -> Self {
        Marker {
            address: None,
            marker_id: MarkerOrdinal::Unset,
            timestamp: None,
            phase: MarkerPhase::Start,
            runtime_host_id: MarkerOrdinal::Unset,
            op_name: String::new(),
            file: String::new(),
            line: None,
            marker_name: String::new(),
            metadata: serde_json::Value::Null,
            keyword_flags: KeywordFlags::EMPTY,
        }
    }
}

impl Marker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: HardwareAddress,
        marker_id: u64,
        timestamp: u64,
        phase: MarkerPhase,
        runtime_host_id: u64,
        op_name: impl Into<String>,
        file: impl Into<String>,
        line: u64,
        marker_name: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        let marker_name = marker_name.into();
        let keyword_flags = classify(&marker_name);
        Marker {
            address: Some(address),
            marker_id: MarkerOrdinal::from_raw(marker_id),
            timestamp: Some(timestamp),
            phase,
            runtime_host_id: MarkerOrdinal::from_raw(runtime_host_id),
            op_name: op_name.into(),
            file: file.into(),
            line: Some(line),
            marker_name,
            metadata,
            keyword_flags,
        }
    }

    /// Location-only marker decoded from a packed address.
    ///
    /// `marker_id` and `runtime_host_id` are [`MarkerOrdinal::Any`]: the marker stands for
    /// every occurrence on this unit. The remaining numeric fields stay unset.
    pub fn from_packed_address(packed: u64) -> Self {
        Marker {
            address: Some(HardwareAddress::from_packed(packed)),
            marker_id: MarkerOrdinal::Any,
            runtime_host_id: MarkerOrdinal::Any,
            ..Marker::default()
        }
    }

    pub fn address(&self) -> Option<HardwareAddress> {
        self.address
    }

    /// Concrete marker ordinal, `None` when unset or any
    pub fn marker_id(&self) -> Option<u64> {
        self.marker_id.id()
    }

    pub fn marker_ordinal(&self) -> MarkerOrdinal {
        self.marker_id
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn phase(&self) -> MarkerPhase {
        self.phase
    }

    pub fn runtime_host_id(&self) -> Option<u64> {
        self.runtime_host_id.id()
    }

    pub fn runtime_host_ordinal(&self) -> MarkerOrdinal {
        self.runtime_host_id
    }

    pub fn op_name(&self) -> &str {
        &self.op_name
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> Option<u64> {
        self.line
    }

    pub fn marker_name(&self) -> &str {
        &self.marker_name
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn keyword_flags(&self) -> KeywordFlags {
        self.keyword_flags
    }

    /// Packed address the sink files this marker's zone under.
    pub fn thread_id(&self) -> Option<u64> {
        self.address.map(|address| address.packed())
    }

    /// The six identity values in comparison order, unset values as [`UNSET_SENTINEL`] and
    /// an "any" marker ordinal as [`ANY_SENTINEL`].
    pub fn raw_identity(&self) -> [u64; 6] {
        let raw = |value: Option<u64>| value.unwrap_or(UNSET_SENTINEL);
        let location = |field: fn(&HardwareAddress) -> u8| {
            raw(self.address.as_ref().map(|address| field(address) as u64))
        };
        [
            raw(self.timestamp),
            location(|a| a.chip_id),
            location(|a| a.core_x),
            location(|a| a.core_y),
            location(|a| a.execution_unit),
            self.marker_id.raw(),
        ]
    }

    /// Rotate-xor fold of [`Marker::raw_identity`].
    pub fn identity_hash(&self) -> u64 {
        self.raw_identity()
            .into_iter()
            .fold(0u64, |hash, value| (hash.rotate_left(5) ^ value).wrapping_mul(HASH_MULTIPLIER))
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.raw_identity() == other.raw_identity()
    }
}

impl Eq for Marker {}

impl PartialOrd for Marker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Marker {
    /// Lexicographic over [`Marker::raw_identity`], so unset and any sort after real values.
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw_identity().cmp(&other.raw_identity())
    }
}

impl Hash for Marker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.identity_hash());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::MarkerNameKeyword;

    fn marker(timestamp: u64, address: HardwareAddress, marker_id: u64) -> Marker {
        Marker::new(
            address,
            marker_id,
            timestamp,
            MarkerPhase::Start,
            0,
            "",
            "kernel.cpp",
            10,
            "zone",
            serde_json::Value::Null,
        )
    }

    #[test]
    fn test_placeholder_is_unset() {
        let placeholder = Marker::default();
        assert_eq!(placeholder.raw_identity(), [UNSET_SENTINEL; 6]);
        assert_eq!(placeholder.thread_id(), None);
        assert!(placeholder.keyword_flags().is_empty());
    }

    #[test]
    fn test_from_packed_address() {
        let address = HardwareAddress::new(2, 9, 1, 4);
        let marker = Marker::from_packed_address(address.packed_with_run(12));
        assert_eq!(marker.address(), Some(address));
        assert_eq!(marker.marker_id(), None);
        assert_eq!(marker.marker_ordinal(), MarkerOrdinal::Any);
        assert_eq!(marker.runtime_host_ordinal(), MarkerOrdinal::Any);
        assert_eq!(marker.thread_id(), Some(address.packed()));

        let raw = marker.raw_identity();
        assert_eq!(raw[0], UNSET_SENTINEL);
        assert_eq!(&raw[1..5], &[2, 9, 1, 4]);
        assert_eq!(raw[5], ANY_SENTINEL);
    }

    #[test]
    fn test_any_and_unset_are_distinct() {
        let address = HardwareAddress::new(0, 1, 1, 0);
        let any = Marker::from_packed_address(address.packed());
        let unset = Marker {
            address: Some(address),
            ..Marker::default()
        };
        assert_ne!(any, unset);
        assert_ne!(any.identity_hash(), unset.identity_hash());
        // any is the largest raw value
        assert!(unset < any);
    }

    #[test]
    fn test_order_agrees_with_raw_identity() {
        let address = HardwareAddress::new(0, 1, 1, 0);
        let set = marker(10, address, 3);
        let unset = Marker::default();
        let any = Marker::from_packed_address(address.packed());

        for (a, b) in [(&set, &unset), (&set, &any), (&any, &unset)] {
            assert_eq!(a.cmp(b), a.raw_identity().cmp(&b.raw_identity()));
        }
        // a populated timestamp sorts before an unset one
        assert!(set < unset);
        assert!(set < any);
    }

    #[test]
    fn test_ordinal_raw_conversions() {
        assert_eq!(MarkerOrdinal::from_raw(UNSET_SENTINEL), MarkerOrdinal::Unset);
        assert_eq!(MarkerOrdinal::from_raw(ANY_SENTINEL), MarkerOrdinal::Any);
        assert_eq!(MarkerOrdinal::from_raw(7), MarkerOrdinal::Id(7));
        assert_eq!(MarkerOrdinal::Id(7).raw(), 7);
        assert_eq!(Option::<u64>::from(MarkerOrdinal::Any), Some(ANY_SENTINEL));
        assert_eq!(Option::<u64>::from(MarkerOrdinal::Unset), None);
    }

    #[test]
    fn test_order_field_precedence() {
        let a = HardwareAddress::new(0, 5, 5, 5);
        let b = HardwareAddress::new(1, 0, 0, 0);
        // timestamp dominates the address
        assert!(marker(1, b, 0) < marker(2, a, 0));
        // chip dominates core and unit
        assert!(marker(1, a, 9) < marker(1, b, 0));
        // marker id breaks the final tie
        assert!(marker(1, a, 1) < marker(1, a, 2));
        assert_eq!(marker(1, a, 1).cmp(&marker(1, a, 1)), Ordering::Equal);
    }

    #[test]
    fn test_equality_ignores_attributes() {
        let address = HardwareAddress::new(0, 1, 1, 0);
        let a = marker(7, address, 3);
        let b = Marker::new(
            address,
            3,
            7,
            MarkerPhase::End,
            99,
            "op",
            "other.cpp",
            1,
            "BRISC-FW",
            serde_json::json!({"k": 1}),
        );
        assert_eq!(a, b);
        assert_eq!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn test_classification_frozen_at_construction() {
        let m = Marker::new(
            HardwareAddress::new(0, 0, 0, 0),
            0,
            0,
            MarkerPhase::Start,
            0,
            "",
            "",
            0,
            "BRISC-FW",
            serde_json::Value::Null,
        );
        assert!(m.keyword_flags().contains(MarkerNameKeyword::BriscFw));
    }

    #[test]
    fn test_serde_recomputes_flags() {
        let m = marker(5, HardwareAddress::new(1, 2, 3, 4), 6);
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("keyword_flags").is_none());

        let restored: Marker = serde_json::from_value(serde_json::json!({
            "address": {"chip_id": 1, "core_x": 2, "core_y": 3, "execution_unit": 4},
            "marker_id": 6,
            "timestamp": 5,
            "runtime_host_id": null,
            "line": null,
            "marker_name": "SYNC-ZONE",
        }))
        .unwrap();
        assert_eq!(restored, m);
        assert!(restored.keyword_flags().contains(MarkerNameKeyword::SyncZone));

        let location = Marker::from_packed_address(HardwareAddress::new(3, 2, 1, 5).packed());
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["marker_id"], serde_json::json!(ANY_SENTINEL));
        assert_eq!(json["timestamp"], serde_json::Value::Null);
        let restored: Marker = serde_json::from_value(json).unwrap();
        assert_eq!(restored.marker_ordinal(), MarkerOrdinal::Any);
        assert_eq!(restored, location);
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!("ZONE_START".parse::<MarkerPhase>().unwrap(), MarkerPhase::Start);
        assert_eq!("ts_event".parse::<MarkerPhase>().unwrap(), MarkerPhase::TimeseriesEvent);
        assert!(matches!(
            "middle".parse::<MarkerPhase>(),
            Err(StructuresError::UnknownPhase(_))
        ));
        assert!(MarkerPhase::End.is_zone_edge());
        assert!(!MarkerPhase::Total.is_zone_edge());
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The core data crate for device tracing. Defines how a hardware location is packed into a
//! single identity, the [`Marker`] event record, and the closed keyword vocabulary used to
//! classify marker names.
//!
//! Nothing in this crate performs I/O or allocates on behalf of the caller beyond what a
//! constructor is handed.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod address;
mod error;
pub mod keyword;
pub mod marker;

pub use address::{decode, encode, encode_with_run, run_of, HardwareAddress};
pub use error::{StructuresError, StructuresResult};
pub use keyword::{classify, derive_label, KeywordFlags, MarkerNameKeyword};
pub use marker::{Marker, MarkerOrdinal, MarkerPhase, ANY_SENTINEL, UNSET_SENTINEL};
